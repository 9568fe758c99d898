//! Veridoc Broadcast Scheduler Lambda
//!
//! Triggered by DynamoDB Streams on the broadcast table. For each inserted
//! row, creates a one-shot EventBridge schedule that starts the broadcast
//! workflow shortly before the start time, and tracks the outcome on the row
//! itself (`schedulerArn`, `status`, `remarks`).

use aws_config::BehaviorVersion;
use aws_lambda_events::event::dynamodb::{Event, EventRecord};
use aws_sdk_scheduler::types::{
    ActionAfterCompletion, FlexibleTimeWindow, FlexibleTimeWindowMode, Target,
};
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde_dynamo::AttributeValue;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;
use veridoc_core::broadcast::{self, BroadcastRecord, STATUS_ERROR, STATUS_PENDING};
use veridoc_core::BroadcastStore;

const STATE_MACHINE_ARN_ENV: &str = "STATE_MACHINE_ARN";
const SCHEDULER_ROLE_ARN_ENV: &str = "SCHEDULER_ROLE_ARN";
const SCHEDULER_GROUP_NAME_ENV: &str = "SCHEDULER_GROUP_NAME";

struct ScheduleTarget {
    state_machine_arn: String,
    role_arn: String,
    group_name: String,
}

impl ScheduleTarget {
    fn from_env() -> Result<Self, LambdaError> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| LambdaError::from(format!("{} not configured", name)))
        };
        Ok(Self {
            state_machine_arn: var(STATE_MACHINE_ARN_ENV)?,
            role_arn: var(SCHEDULER_ROLE_ARN_ENV)?,
            group_name: var(SCHEDULER_GROUP_NAME_ENV)?,
        })
    }
}

/// Extract string value from AttributeValue
fn get_string(av: &AttributeValue) -> Option<&str> {
    match av {
        AttributeValue::S(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Create the schedule for a freshly inserted broadcast row
async fn process_insert(
    store: &BroadcastStore,
    scheduler: &aws_sdk_scheduler::Client,
    target: &ScheduleTarget,
    record: &EventRecord,
) -> Result<(), LambdaError> {
    let new_image = &record.change.new_image;

    if new_image.is_empty() {
        warn!("Empty new image in record");
        return Ok(());
    }

    let field = |name: &str| {
        new_image
            .get(name)
            .and_then(get_string)
            .map(|s| s.to_string())
    };
    let broadcast_record = BroadcastRecord {
        channel_id: field("channelId").unwrap_or_default(),
        start_time: field("startTime").unwrap_or_default(),
        end_time: field("endTime").unwrap_or_default(),
        manifest_url: field("manifestUrl"),
    };
    let channel_id = broadcast_record.channel_id.clone();
    let start_time = broadcast_record.start_time.clone();

    if let Err(message) = broadcast::validate_for_schedule(&broadcast_record) {
        warn!(channel_id = %channel_id, error = %message, "Record failed validation");
        if !channel_id.is_empty() && !start_time.is_empty() {
            store
                .set_status(
                    &channel_id,
                    &start_time,
                    STATUS_ERROR,
                    &format!("Validation failure: {}", message),
                )
                .await?;
        }
        return Ok(());
    }

    let lead_minutes = broadcast::lead_minutes();
    let fire_at = broadcast::schedule_time(&start_time, lead_minutes)
        .ok_or_else(|| format!("Unparseable startTime: {}", start_time))?;
    let fire_at_str = fire_at.format("%Y-%m-%dT%H:%M:%S").to_string();

    let schedule_name = format!("broadcast-schedule-{}-{}", channel_id, Uuid::new_v4());
    let workflow_input = json!({
        "channelId": &channel_id,
        "startTime": &start_time,
        "endTime": &broadcast_record.end_time,
        "scheduledTime": &fire_at_str,
    });

    let schedule_target = Target::builder()
        .arn(&target.state_machine_arn)
        .role_arn(&target.role_arn)
        .input(workflow_input.to_string())
        .build()
        .map_err(|e| format!("invalid schedule target: {}", e))?;
    let window = FlexibleTimeWindow::builder()
        .mode(FlexibleTimeWindowMode::Off)
        .build()
        .map_err(|e| format!("invalid time window: {}", e))?;

    let result = scheduler
        .create_schedule()
        .name(&schedule_name)
        .group_name(&target.group_name)
        .schedule_expression(format!("at({})", fire_at_str))
        .flexible_time_window(window)
        .target(schedule_target)
        .description(format!(
            "Schedule for broadcast channel {} ({} minutes before start time)",
            channel_id, lead_minutes
        ))
        .action_after_completion(ActionAfterCompletion::Delete)
        .send()
        .await;

    match result {
        Ok(response) => {
            let scheduler_arn = response.schedule_arn().to_string();

            info!(
                schedule_name = %schedule_name,
                fire_at = %fire_at_str,
                "Created schedule"
            );

            store
                .set_scheduler_arn(&channel_id, &start_time, &scheduler_arn)
                .await?;
            store
                .set_status(
                    &channel_id,
                    &start_time,
                    STATUS_PENDING,
                    "Schedule created successfully",
                )
                .await?;
            Ok(())
        }
        Err(e) => {
            let message = format!("Error creating schedule: {}", e);
            error!(channel_id = %channel_id, error = %message, "Schedule creation failed");
            store
                .set_status(&channel_id, &start_time, STATUS_ERROR, &message)
                .await?;
            // Fail the batch so the stream retries
            Err(message.into())
        }
    }
}

async fn handler(event: LambdaEvent<Event>) -> Result<(), LambdaError> {
    let (payload, _context) = event.into_parts();

    info!(record_count = payload.records.len(), "Processing DynamoDB Stream batch");

    let target = ScheduleTarget::from_env()?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let scheduler = aws_sdk_scheduler::Client::new(&config);
    let store = BroadcastStore::new(dynamo_client);

    for record in &payload.records {
        if record.event_source.as_deref() != Some("aws:dynamodb") {
            continue;
        }

        match record.event_name.as_str() {
            "INSERT" => {
                info!("Processing new record");
                process_insert(&store, &scheduler, &target, record).await?;
            }
            "MODIFY" => {
                info!("Record modified - logging only");
            }
            "REMOVE" => {
                info!("Record deleted - logging only");
            }
            other => {
                warn!(event_name = %other, "Ignoring unexpected event");
            }
        }
    }

    Ok(())
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
