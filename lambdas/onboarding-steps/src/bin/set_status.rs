//! Onboarding workflow: apply a status to an onboarding request
//!
//! The workflow passes the raw item key (`pk = REQUEST#{id}`) together with
//! the target status.

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use veridoc_core::{OnboardingStatus, OnboardingStore};

#[derive(Deserialize)]
struct Input {
    pk: String,
    status: OnboardingStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    request_id: String,
    status: OnboardingStatus,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    let request_id = input
        .pk
        .strip_prefix("REQUEST#")
        .ok_or_else(|| format!("Unexpected pk format: {}", input.pk))?
        .to_string();

    info!(request_id = %request_id, status = input.status.as_str(), "Updating onboarding status");

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let store = OnboardingStore::new(dynamo_client);

    let updated = store.update_status(&request_id, input.status).await?;

    Ok(Output {
        request_id,
        status: updated.status,
    })
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
