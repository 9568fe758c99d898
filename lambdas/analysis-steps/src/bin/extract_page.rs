//! Analysis workflow: extract structured content from one page
//!
//! Pulls the page's text out of the PDF, runs it through the extraction
//! prompt, and stores the result with its token counts on the analysis.

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use veridoc_analysis_steps::pdf;
use veridoc_core::bedrock;
use veridoc_core::AnalysisStore;

const BUCKET_NAME_ENV: &str = "BUCKET_NAME";
const EXTRACTION_PROMPT_ID_ENV: &str = "EXTRACTION_PROMPT_ID";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    analysis_id: String,
    object_key: String,
    page_number: u32,
    total_pages: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    analysis_id: String,
    object_key: String,
    page_number: u32,
    content: String,
    token_input: u64,
    token_output: u64,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    let bucket = std::env::var(BUCKET_NAME_ENV)
        .map_err(|_| format!("{} not configured", BUCKET_NAME_ENV))?;
    let prompt_id = std::env::var(EXTRACTION_PROMPT_ID_ENV)
        .map_err(|_| format!("{} not configured", EXTRACTION_PROMPT_ID_ENV))?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&config);
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let agent_client = aws_sdk_bedrockagent::Client::new(&config);
    let runtime_client = aws_sdk_bedrockruntime::Client::new(&config);
    let store = AnalysisStore::new(dynamo_client);

    let bytes = pdf::fetch_document(&s3_client, &bucket, &input.object_key).await?;
    let document = pdf::load(&bytes)?;
    let page_text = pdf::page_text(&document, input.page_number)?;

    let template = bedrock::fetch_prompt(&agent_client, &prompt_id).await?;
    let prompt = format!("{}\n\n{}", template.text, page_text);

    let reply = bedrock::invoke(&runtime_client, &prompt).await?;

    info!(
        analysis_id = %input.analysis_id,
        object_key = %input.object_key,
        page = input.page_number,
        total_pages = input.total_pages,
        token_input = reply.input_tokens,
        token_output = reply.output_tokens,
        "Processed page"
    );

    store
        .update_page_content(
            &input.analysis_id,
            &input.object_key,
            input.page_number,
            reply.text.clone(),
            reply.input_tokens,
            reply.output_tokens,
        )
        .await?;

    Ok(Output {
        analysis_id: input.analysis_id,
        object_key: input.object_key,
        page_number: input.page_number,
        content: reply.text,
        token_input: reply.input_tokens,
        token_output: reply.output_tokens,
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
