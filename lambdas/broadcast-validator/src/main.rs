//! Veridoc Broadcast Validator Lambda
//!
//! First step of the broadcast workflow. Receives one DynamoDB-stream-shaped
//! envelope, validates the broadcast row and emits the schedule name,
//! schedule expression and workflow input for the downstream states.
//!
//! The handler never fails the workflow with a thrown error: every problem
//! is reported as `isValid: false` with whatever record fields could be
//! recovered.

use std::collections::HashMap;

use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::Deserialize;
use serde_dynamo::AttributeValue;
use serde_json::{json, Value};
use tracing::{info, warn};
use veridoc_core::broadcast::{self, BroadcastRecord};

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "eventName")]
    event_name: String,
    dynamodb: StreamImages,
}

#[derive(Deserialize, Default)]
struct StreamImages {
    #[serde(rename = "NewImage", default)]
    new_image: Option<HashMap<String, AttributeValue>>,
    #[serde(rename = "OldImage", default)]
    old_image: Option<HashMap<String, AttributeValue>>,
}

fn get_string(image: &HashMap<String, AttributeValue>, field: &str) -> Option<String> {
    match image.get(field) {
        Some(AttributeValue::S(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Recover whatever record fields the image carries
fn recover_record(image: &HashMap<String, AttributeValue>) -> BroadcastRecord {
    BroadcastRecord {
        channel_id: get_string(image, "channelId").unwrap_or_default(),
        start_time: get_string(image, "startTime").unwrap_or_default(),
        end_time: get_string(image, "endTime").unwrap_or_default(),
        manifest_url: get_string(image, "manifestUrl"),
    }
}

fn invalid(error: impl Into<String>, record: &BroadcastRecord) -> Value {
    json!({
        "isValid": false,
        "error": error.into(),
        "record": record,
    })
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    let (payload, _context) = event.into_parts();

    let envelope: Envelope = match serde_json::from_value(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Unparseable stream envelope");
            return Ok(json!({
                "isValid": false,
                "error": format!("Processing error: {}", e),
                "record": {},
            }));
        }
    };

    // REMOVE events carry the old image, everything else the new one
    let image = if envelope.event_name == "REMOVE" {
        envelope.dynamodb.old_image
    } else {
        envelope.dynamodb.new_image
    };
    let Some(image) = image else {
        return Ok(json!({
            "isValid": false,
            "error": "Missing stream image",
            "record": {},
        }));
    };

    let record = recover_record(&image);

    if let Err(message) = broadcast::validate(&record) {
        warn!(channel_id = %record.channel_id, error = %message, "Validation failed");
        return Ok(invalid(message, &record));
    }

    let schedule_name = broadcast::schedule_name(&record);
    let Some(schedule_expression) = broadcast::schedule_expression(&record.start_time) else {
        return Ok(invalid(
            format!(
                "Invalid startTime format: {}. Must be ISO8601",
                record.start_time
            ),
            &record,
        ));
    };

    let workflow_input = json!({
        "channelId": &record.channel_id,
        "startTime": &record.start_time,
        "endTime": &record.end_time,
        "manifestUrl": record.manifest_url.clone().unwrap_or_default(),
    });

    info!(
        channel_id = %record.channel_id,
        schedule_name = %schedule_name,
        "Broadcast record validated"
    );

    Ok(json!({
        "isValid": true,
        "record": record,
        "scheduleName": schedule_name,
        "scheduleExpression": schedule_expression,
        "workflowInput": workflow_input.to_string(),
    }))
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;

    fn insert_envelope(image: Value) -> Value {
        json!({
            "eventName": "INSERT",
            "dynamodb": { "NewImage": image }
        })
    }

    #[tokio::test]
    async fn test_valid_insert() {
        let event = insert_envelope(json!({
            "channelId": { "S": "8812210" },
            "startTime": { "S": "2025-06-01T18:00:00Z" },
            "endTime": { "S": "2025-06-01T20:00:00Z" },
            "manifestUrl": { "S": "https://cdn.example.com/live/index.m3u8" }
        }));

        let output = handler(LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();

        assert_eq!(output["isValid"], true);
        assert_eq!(
            output["scheduleName"],
            "broadcast-8812210-2025-06-01T18-00-00Z"
        );
        assert_eq!(output["scheduleExpression"], "at(2025-06-01T18:00:00)");

        let workflow_input: Value =
            serde_json::from_str(output["workflowInput"].as_str().unwrap()).unwrap();
        assert_eq!(workflow_input["channelId"], "8812210");
        assert_eq!(
            workflow_input["manifestUrl"],
            "https://cdn.example.com/live/index.m3u8"
        );
    }

    #[tokio::test]
    async fn test_invalid_record_is_reported_not_thrown() {
        let event = insert_envelope(json!({
            "channelId": { "S": "not-a-number" },
            "startTime": { "S": "2025-06-01T18:00:00Z" },
            "endTime": { "S": "2025-06-01T20:00:00Z" },
            "manifestUrl": { "S": "https://cdn.example.com/live/index.m3u8" }
        }));

        let output = handler(LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();

        assert_eq!(output["isValid"], false);
        assert!(output["error"].as_str().unwrap().contains("channelId"));
        // Recovered fields are still present
        assert_eq!(output["record"]["channelId"], "not-a-number");
    }

    #[tokio::test]
    async fn test_remove_uses_old_image() {
        let event = json!({
            "eventName": "REMOVE",
            "dynamodb": {
                "OldImage": {
                    "channelId": { "S": "42" },
                    "startTime": { "S": "2025-06-01T18:00:00Z" },
                    "endTime": { "S": "2025-06-01T20:00:00Z" },
                    "manifestUrl": { "S": "https://cdn.example.com/live/stream.mpd" }
                }
            }
        });

        let output = handler(LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();

        assert_eq!(output["isValid"], true);
        assert_eq!(output["record"]["channelId"], "42");
    }

    #[tokio::test]
    async fn test_garbage_envelope() {
        let output = handler(LambdaEvent::new(json!({"foo": "bar"}), Context::default()))
            .await
            .unwrap();

        assert_eq!(output["isValid"], false);
        assert!(output["error"]
            .as_str()
            .unwrap()
            .starts_with("Processing error:"));
    }
}
