//! Onboarding workflow: begin the document check
//!
//! Loads the onboarding request, seeds the linked analysis with the document
//! skeleton and identity parameters, and stores the workflow task token so
//! the analysis pipeline can call back when it finishes.

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use veridoc_core::store::analysis::AnalysisUpdate;
use veridoc_core::{
    AnalysisParameters, AnalysisStatus, AnalysisStore, ObjectData, OnboardingStore,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    request_id: String,
    task_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    analysis_id: String,
    onboarding_id: String,
    task_token: String,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    info!(request_id = %input.request_id, "Beginning onboarding check");

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let onboarding = OnboardingStore::new(dynamo_client.clone());
    let analyses = AnalysisStore::new(dynamo_client);

    let request = onboarding.get(&input.request_id).await?;

    if request.analysis_id.is_empty() {
        return Err(format!("No analysisId found for request {}", input.request_id).into());
    }
    if request.documents.is_empty() {
        return Err(format!("No documents found for request {}", input.request_id).into());
    }

    let objects_data: Vec<ObjectData> = request
        .documents
        .iter()
        .map(|doc| ObjectData::skeleton(doc.as_str()))
        .collect();

    let parameters = AnalysisParameters {
        first_name: Some(request.first_name),
        middle_name: request.middle_name,
        last_name: Some(request.last_name),
        address: Some(request.address),
        onboarding_id: input.request_id.clone(),
    };

    analyses
        .update(
            &request.analysis_id,
            AnalysisUpdate {
                status: Some(AnalysisStatus::Started),
                objects_data: Some(objects_data),
                task_token: Some(input.task_token.clone()),
                analysis_parameters: Some(parameters),
                ..Default::default()
            },
        )
        .await?;

    info!(
        analysis_id = %request.analysis_id,
        onboarding_id = %input.request_id,
        "Analysis seeded from onboarding request"
    );

    Ok(Output {
        analysis_id: request.analysis_id,
        onboarding_id: input.request_id,
        task_token: input.task_token,
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
