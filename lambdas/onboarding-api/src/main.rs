//! Veridoc Onboarding API Lambda
//!
//! Handles onboarding request management:
//! - POST /onboarding - Create onboarding request
//! - GET /onboarding - List onboarding requests
//! - GET /onboarding/{onboarding_id} - Get onboarding request
//! - POST /onboarding/email/generate - Generate support email content

use aws_config::BehaviorVersion;
use chrono::Utc;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, RequestExt, Response};
use serde::Serialize;
use tracing::{error, info};
use veridoc_core::bedrock;
use veridoc_core::validation::validate_onboarding_body;
use veridoc_core::{
    CreateOnboardingResponse, Error, ErrorBody, GenerateEmailRequest, GenerateEmailResponse,
    ListOnboardingResponse, NewOnboardingRequest, OnboardingDetailResponse, OnboardingStore,
};

const EMAIL_PROMPT_ID_ENV: &str = "EMAIL_PROMPT_ID";
const DEFAULT_LIMIT: i32 = 50;

async fn handler(event: Request) -> Result<Response<Body>, LambdaError> {
    let method = event.method().as_str();
    let path = event.uri().path().to_string();

    info!(method = %method, path = %path, "Processing onboarding request");

    // Initialize AWS clients
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let store = OnboardingStore::new(dynamo_client);

    let path_params = event.path_parameters();
    let onboarding_id = path_params.first("onboarding_id").map(|s| s.to_string());

    match (method, path.as_str()) {
        // POST /onboarding - Create onboarding request
        ("POST", "/onboarding") => {
            let body = event.body();
            let body_str = std::str::from_utf8(body).map_err(|_| "Invalid UTF-8 in body")?;
            let json: serde_json::Value = match serde_json::from_str(body_str) {
                Ok(json) => json,
                Err(e) => return error_response(Error::Validation(e.to_string())),
            };

            if let Err(e) = validate_onboarding_body(&json) {
                return error_response(e);
            }
            let data: NewOnboardingRequest = serde_json::from_value(json)?;

            match store.create(data).await {
                Ok(created) => {
                    info!(
                        unique_id = %created.unique_id,
                        analysis_id = %created.analysis_id,
                        document_count = created.documents.len(),
                        "Onboarding request created"
                    );
                    json_response(
                        201,
                        &CreateOnboardingResponse {
                            unique_id: created.unique_id,
                            status: created.status,
                            analysis_id: created.analysis_id,
                            documents: created.documents,
                            created_at: created.created_at,
                        },
                    )
                }
                Err(e) => error_response(e),
            }
        }

        // GET /onboarding - List onboarding requests
        ("GET", "/onboarding") => {
            let query = event.query_string_parameters();
            let limit = match parse_limit(query.first("limit")) {
                Ok(limit) => limit,
                Err(e) => return error_response(e),
            };
            let next_token = query.first("nextToken").map(|s| s.to_string());

            match store.list(limit, next_token.as_deref()).await {
                Ok(page) => json_response(
                    200,
                    &ListOnboardingResponse {
                        items: page.items.into_iter().map(Into::into).collect(),
                        fetched_at: Utc::now(),
                        next_token: page.next_token,
                    },
                ),
                Err(e) => error_response(e),
            }
        }

        // POST /onboarding/email/generate - Generate support email content
        ("POST", "/onboarding/email/generate") => {
            let body = event.body();
            let body_str = std::str::from_utf8(body).map_err(|_| "Invalid UTF-8 in body")?;
            let req: GenerateEmailRequest = match serde_json::from_str(body_str) {
                Ok(req) => req,
                Err(e) => return error_response(Error::Validation(e.to_string())),
            };
            if req.issue.is_empty() {
                return error_response(Error::Validation("issue must not be empty".to_string()));
            }

            match generate_email(&config, &req.issue).await {
                Ok(response) => json_response(200, &response),
                Err(e) => error_response(e),
            }
        }

        // GET /onboarding/{onboarding_id} - Get onboarding request
        ("GET", p) if p.starts_with("/onboarding/") => {
            let onboarding_id = onboarding_id.ok_or("Missing onboarding_id")?;

            match store.get(&onboarding_id).await {
                Ok(item) => {
                    info!(request_id = %onboarding_id, status = item.status.as_str(), "Retrieved onboarding request");
                    json_response(
                        200,
                        &OnboardingDetailResponse {
                            data: item.into(),
                            fetched_at: Utc::now(),
                        },
                    )
                }
                Err(e) => error_response(e),
            }
        }

        // Not found
        _ => Ok(Response::builder()
            .status(404)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&ErrorBody::new(
                "not_found",
                "Endpoint not found",
            ))?))?),
    }
}

/// Render the support-email prompt with the reported issue and invoke the model
async fn generate_email(
    config: &aws_config::SdkConfig,
    issue: &str,
) -> Result<GenerateEmailResponse, Error> {
    let prompt_id = std::env::var(EMAIL_PROMPT_ID_ENV)
        .map_err(|_| Error::Internal(format!("{} not configured", EMAIL_PROMPT_ID_ENV)))?;

    let agent_client = aws_sdk_bedrockagent::Client::new(config);
    let runtime_client = aws_sdk_bedrockruntime::Client::new(config);

    let template = bedrock::fetch_prompt(&agent_client, &prompt_id).await?;
    let prompt = bedrock::render(&template.text, &[("issue", issue)]);

    let reply = bedrock::invoke(&runtime_client, &prompt).await?;
    let (content, thinking) = bedrock::extract_tagged(&reply.text);
    let content = content
        .ok_or_else(|| Error::ModelResponse("no response content in model output".to_string()))?;

    info!(
        input_tokens = reply.input_tokens,
        output_tokens = reply.output_tokens,
        "Generated email content"
    );

    Ok(GenerateEmailResponse {
        content,
        thinking: thinking.unwrap_or_default(),
        input_token: reply.input_tokens,
        output_token: reply.output_tokens,
    })
}

fn parse_limit(raw: Option<&str>) -> Result<i32, Error> {
    match raw {
        None => Ok(DEFAULT_LIMIT),
        Some(raw) => match raw.parse::<i32>() {
            Ok(limit) if (1..=100).contains(&limit) => Ok(limit),
            Ok(_) => Err(Error::Validation("Limit must be between 1 and 100".to_string())),
            Err(_) => Err(Error::Validation("Invalid limit value".to_string())),
        },
    }
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body)?))?)
}

fn error_response(e: Error) -> Result<Response<Body>, LambdaError> {
    error!(error = %e, "Request failed");
    let status = e.status_code();
    let body = ErrorBody::new(e.code(), e.to_string());
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body)?))?)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_default() {
        assert_eq!(parse_limit(None).unwrap(), 50);
    }

    #[test]
    fn test_parse_limit_bounds() {
        assert_eq!(parse_limit(Some("1")).unwrap(), 1);
        assert_eq!(parse_limit(Some("100")).unwrap(), 100);
        assert!(parse_limit(Some("0")).is_err());
        assert!(parse_limit(Some("101")).is_err());
        assert!(parse_limit(Some("ten")).is_err());
    }
}
