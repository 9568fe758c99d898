//! Onboarding workflow: mark a request as ready for review

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use veridoc_core::{OnboardingStatus, OnboardingStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    onboarding_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    onboarding_id: String,
    status: OnboardingStatus,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let store = OnboardingStore::new(dynamo_client);

    store
        .update_status(&input.onboarding_id, OnboardingStatus::ReadyToCheck)
        .await?;

    info!(
        onboarding_id = %input.onboarding_id,
        status = OnboardingStatus::ReadyToCheck.as_str(),
        "Updated onboarding status"
    );

    Ok(Output {
        onboarding_id: input.onboarding_id,
        status: OnboardingStatus::ReadyToCheck,
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
