//! Veridoc Broadcast Health Check Lambda
//!
//! Workflow step that validates a broadcast's streaming endpoint: fetches
//! the manifest, checks its structure (HLS or DASH by extension) and probes
//! the first HLS media segment when one is present.
//!
//! The verdict is merged into the incoming event so downstream states keep
//! every field they passed in. The handler never throws: fetch errors and
//! unexpected failures all come back as `Unhealthy` with details.

use std::time::Duration;

use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde_json::{Map, Value};
use tracing::{info, warn};
use url::Url;
use veridoc_core::broadcast::{STATUS_HEALTHY, STATUS_UNHEALTHY};
use veridoc_core::manifest;

const USER_AGENT: &str = "veridoc-health-check";
const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);
const SEGMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Merge the verdict into the original event payload
fn respond(event: Value, status: &str, details: impl Into<String>) -> Value {
    let mut merged = match event {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.insert("status".to_string(), Value::String(status.to_string()));
    merged.insert("details".to_string(), Value::String(details.into()));
    Value::Object(merged)
}

/// Fetch and validate the streaming endpoint
async fn check_endpoint(client: &reqwest::Client, raw_url: &str) -> Result<String, String> {
    let url = Url::parse(raw_url).map_err(|e| format!("Invalid manifestUrl: {}", e))?;

    let response = client
        .get(url.clone())
        .timeout(MANIFEST_TIMEOUT)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch manifest: {}", e))?;
    if !response.status().is_success() {
        return Err(format!("Failed to fetch manifest: HTTP {}", response.status()));
    }
    let content = response
        .text()
        .await
        .map_err(|e| format!("Error fetching manifest: {}", e))?;

    let lowered = raw_url.to_lowercase();
    if lowered.ends_with(".m3u8") {
        let segment = manifest::check_hls(&content, &url)?;

        // Probe the first media segment when the playlist carries one
        if let Some(segment_url) = segment {
            let head = client
                .head(segment_url.clone())
                .timeout(SEGMENT_TIMEOUT)
                .send()
                .await;
            let accessible = matches!(&head, Ok(r) if r.status().is_success());
            if !accessible {
                return Err(format!("First segment not accessible: {}", segment_url));
            }
        }
        Ok("HLS manifest is valid".to_string())
    } else if lowered.ends_with(".mpd") {
        manifest::check_dash(&content)?;
        Ok("DASH manifest is valid".to_string())
    } else {
        Err("Unsupported manifest format".to_string())
    }
}

async fn handler(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    let (payload, _context) = event.into_parts();

    let manifest_url = payload
        .get("manifestUrl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);
    let Some(manifest_url) = manifest_url else {
        warn!("Missing manifestUrl in record");
        return Ok(respond(
            payload,
            STATUS_UNHEALTHY,
            "Missing manifestUrl in record",
        ));
    };

    let client = match reqwest::Client::builder().user_agent(USER_AGENT).build() {
        Ok(client) => client,
        Err(e) => {
            return Ok(respond(
                payload,
                STATUS_UNHEALTHY,
                format!("Error checking health: {}", e),
            ))
        }
    };

    match check_endpoint(&client, &manifest_url).await {
        Ok(details) => {
            info!(manifest_url = %manifest_url, "Endpoint healthy");
            Ok(respond(payload, STATUS_HEALTHY, details))
        }
        Err(details) => {
            warn!(manifest_url = %manifest_url, details = %details, "Endpoint unhealthy");
            Ok(respond(payload, STATUS_UNHEALTHY, details))
        }
    }
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
    use serde_json::json;

    #[test]
    fn test_respond_merges_passthrough_fields() {
        let event = json!({
            "channelId": "42",
            "startTime": "2025-06-01T18:00:00Z",
            "manifestUrl": "https://cdn.example.com/live/index.m3u8"
        });
        let merged = respond(event, STATUS_HEALTHY, "HLS manifest is valid");

        assert_eq!(merged["status"], "Healthy");
        assert_eq!(merged["details"], "HLS manifest is valid");
        assert_eq!(merged["channelId"], "42");
        assert_eq!(merged["startTime"], "2025-06-01T18:00:00Z");
    }

    #[test]
    fn test_respond_overrides_previous_verdict() {
        let event = json!({ "status": "Pending" });
        let merged = respond(event, STATUS_UNHEALTHY, "boom");
        assert_eq!(merged["status"], "Unhealthy");
    }

    #[tokio::test]
    async fn test_missing_manifest_url_is_unhealthy() {
        let event = json!({ "channelId": "42" });
        let output = handler(LambdaEvent::new(event, Context::default()))
            .await
            .unwrap();

        assert_eq!(output["status"], "Unhealthy");
        assert_eq!(output["details"], "Missing manifestUrl in record");
        assert_eq!(output["channelId"], "42");
    }
}
