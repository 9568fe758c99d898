//! Analysis workflow: run the final analysis pass
//!
//! Assembles the extracted page content into `<document-N>` blocks, renders
//! the analysis prompt with them and the identity fields, and stores the
//! model's verdict on the analysis.

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::info;
use veridoc_analysis_steps::prompts;
use veridoc_core::bedrock;
use veridoc_core::store::analysis::AnalysisUpdate;
use veridoc_core::{AnalysisResult, AnalysisStore};

const ANALYSIS_PROMPT_ID_ENV: &str = "ANALYSIS_PROMPT_ID";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    analysis_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    analysis_id: String,
    analysis_results: Vec<AnalysisResult>,
}

async fn handler(event: LambdaEvent<Input>) -> Result<Output, LambdaError> {
    let (input, _context) = event.into_parts();

    let prompt_id = std::env::var(ANALYSIS_PROMPT_ID_ENV)
        .map_err(|_| format!("{} not configured", ANALYSIS_PROMPT_ID_ENV))?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let agent_client = aws_sdk_bedrockagent::Client::new(&config);
    let runtime_client = aws_sdk_bedrockruntime::Client::new(&config);
    let store = AnalysisStore::new(dynamo_client);

    let analysis = store.get(&input.analysis_id).await?;

    let template = bedrock::fetch_prompt(&agent_client, &prompt_id).await?;
    info!(prompt_name = %template.name, "Retrieved analysis prompt");

    let document_content = prompts::document_blocks(&analysis.objects_data);
    let identity = prompts::identity_input(analysis.analysis_parameters.as_ref());
    let prompt = bedrock::render(
        &template.text,
        &[("document", document_content.as_str()), ("input", identity.as_str())],
    );

    let reply = bedrock::invoke(&runtime_client, &prompt).await?;
    let (result, thinking) = bedrock::extract_tagged(&reply.text);
    let result = result.ok_or("no response content in model output")?;

    let analysis_result = AnalysisResult {
        analysis: template.name.clone(),
        result,
        thinking,
        input_token: reply.input_tokens,
        output_token: reply.output_tokens,
    };

    store
        .update(
            &input.analysis_id,
            AnalysisUpdate {
                analysis_results: Some(vec![analysis_result.clone()]),
                ..Default::default()
            },
        )
        .await?;

    info!(
        analysis_id = %input.analysis_id,
        prompt_name = %template.name,
        input_tokens = reply.input_tokens,
        output_tokens = reply.output_tokens,
        "Analysis completed"
    );

    Ok(Output {
        analysis_id: input.analysis_id,
        analysis_results: vec![analysis_result],
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
