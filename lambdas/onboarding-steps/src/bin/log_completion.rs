//! Onboarding workflow: log the completion of the analysis

use chrono::{DateTime, Utc};
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    analysis_id: String,
    status: String,
    onboarding_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    analysis_id: String,
    status: String,
    onboarding_id: String,
    completed_at: DateTime<Utc>,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    if input.analysis_id.is_empty() {
        return Err("Missing analysisId".into());
    }

    info!(
        analysis_id = %input.analysis_id,
        status = %input.status,
        onboarding_id = %input.onboarding_id,
        "Analysis completed"
    );

    Ok(Output {
        analysis_id: input.analysis_id,
        status: input.status,
        onboarding_id: input.onboarding_id,
        completed_at: Utc::now(),
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
