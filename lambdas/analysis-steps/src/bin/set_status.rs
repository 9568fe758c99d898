//! Analysis workflow: apply a status (and optionally object data)

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use veridoc_core::store::analysis::AnalysisUpdate;
use veridoc_core::{AnalysisStatus, AnalysisStore, ObjectData};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    analysis_id: String,
    status: AnalysisStatus,
    #[serde(default)]
    objects_data: Option<Vec<ObjectData>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    analysis_id: String,
    status: AnalysisStatus,
    objects_data: Vec<ObjectData>,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let store = AnalysisStore::new(dynamo_client);

    let updated = store
        .update(
            &input.analysis_id,
            AnalysisUpdate {
                status: Some(input.status),
                objects_data: input.objects_data,
                ..Default::default()
            },
        )
        .await?;

    info!(
        analysis_id = %input.analysis_id,
        status = input.status.as_str(),
        "Analysis status updated"
    );

    Ok(Output {
        analysis_id: input.analysis_id,
        status: updated.status,
        objects_data: updated.objects_data,
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
