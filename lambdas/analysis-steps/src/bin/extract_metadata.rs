//! Analysis workflow: extract PDF metadata
//!
//! Counts the pages of every uploaded document and emits the flat page-task
//! list consumed by the per-page Map state.

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use veridoc_analysis_steps::pdf;
use veridoc_core::store::analysis::AnalysisUpdate;
use veridoc_core::{AnalysisStore, ObjectData};

const BUCKET_NAME_ENV: &str = "BUCKET_NAME";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    analysis_id: String,
    objects_data: Vec<ObjectData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageTask {
    object_key: String,
    page_number: u32,
    total_pages: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    analysis_id: String,
    objects_data: Vec<ObjectData>,
    /// One entry per page across all objects, for the Map state
    page_tasks: Vec<PageTask>,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    let bucket = std::env::var(BUCKET_NAME_ENV)
        .map_err(|_| format!("{} not configured", BUCKET_NAME_ENV))?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&config);
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let store = AnalysisStore::new(dynamo_client);

    let mut processed_objects = Vec::with_capacity(input.objects_data.len());
    let mut page_tasks = Vec::new();

    for object in &input.objects_data {
        let bytes = pdf::fetch_document(&s3_client, &bucket, &object.object).await?;
        let document = pdf::load(&bytes)?;
        let total_pages = pdf::page_count(&document);

        let mut skeleton = ObjectData::skeleton(object.object.as_str());
        skeleton.number_of_pages = Some(total_pages);
        processed_objects.push(skeleton);

        for page_number in 1..=total_pages {
            page_tasks.push(PageTask {
                object_key: object.object.clone(),
                page_number,
                total_pages,
            });
        }
    }

    store
        .update(
            &input.analysis_id,
            AnalysisUpdate {
                objects_data: Some(processed_objects.clone()),
                ..Default::default()
            },
        )
        .await?;

    info!(
        analysis_id = %input.analysis_id,
        object_count = processed_objects.len(),
        total_page_tasks = page_tasks.len(),
        "PDF metadata extracted"
    );

    Ok(Output {
        analysis_id: input.analysis_id,
        objects_data: processed_objects,
        page_tasks,
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
