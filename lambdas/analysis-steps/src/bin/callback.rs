//! Analysis workflow: resume the waiting onboarding workflow
//!
//! Loads the task token stored when the check began and sends it back to
//! Step Functions with the final analysis status.

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use veridoc_core::AnalysisStore;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    analysis_id: String,
    status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    status_code: u16,
    body: String,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let sfn_client = aws_sdk_sfn::Client::new(&config);
    let store = AnalysisStore::new(dynamo_client);

    let analysis = store.get(&input.analysis_id).await?;

    let task_token = analysis
        .task_token
        .ok_or_else(|| format!("No task token found for analysis: {}", input.analysis_id))?;
    let onboarding_id = analysis
        .analysis_parameters
        .map(|p| p.onboarding_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            format!(
                "No onboardingId found in analysisParameters for analysis: {}",
                input.analysis_id
            )
        })?;

    let output = json!({
        "analysisId": &input.analysis_id,
        "status": &input.status,
        "onboardingId": &onboarding_id,
    });

    sfn_client
        .send_task_success()
        .task_token(task_token)
        .output(serde_json::to_string(&output)?)
        .send()
        .await
        .map_err(|e| format!("failed to send task success: {}", e))?;

    info!(
        analysis_id = %input.analysis_id,
        status = %input.status,
        onboarding_id = %onboarding_id,
        "Sent task success"
    );

    Ok(Output {
        status_code: 200,
        body: "Success".to_string(),
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
