//! Veridoc Analysis API Lambda
//!
//! Handles analysis management and document access:
//! - POST /analyses - Create analysis
//! - GET /analyses - List analyses
//! - GET /analyses/{analysis_id} - Get analysis
//! - POST /analyses/{analysis_id}/upload-urls - Presigned upload URLs
//! - POST /analyses/{analysis_id}/start - Start the analysis workflow
//! - POST /documents/get-url - Presigned download URL

use aws_config::BehaviorVersion;
use chrono::Utc;
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, RequestExt, Response};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;
use veridoc_core::presign;
use veridoc_core::store::analysis::AnalysisUpdate;
use veridoc_core::validation::validate_analysis_id;
use veridoc_core::{
    AnalysisDetailResponse, AnalysisStatus, AnalysisStore, CreateAnalysisResponse,
    DocumentKind, DocumentUrlRequest, DocumentUrlResponse, Error, ErrorBody,
    ListAnalysesResponse, ObjectData, PresignedUpload, StartAnalysisRequest,
    StartAnalysisResponse, UploadUrlsRequest, UploadUrlsResponse,
};

const BUCKET_NAME_ENV: &str = "BUCKET_NAME";
const DEFAULT_LIMIT: i32 = 50;

async fn handler(event: Request) -> Result<Response<Body>, LambdaError> {
    let method = event.method().as_str();
    let path = event.uri().path().to_string();

    info!(method = %method, path = %path, "Processing analysis request");

    // Initialize AWS clients
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let store = AnalysisStore::new(dynamo_client);

    let path_params = event.path_parameters();
    let analysis_id = path_params.first("analysis_id").map(|s| s.to_string());

    match (method, path.as_str()) {
        // POST /analyses - Create analysis
        ("POST", "/analyses") => {
            match store.create(String::new(), DocumentKind::Mixed).await {
                Ok(analysis) => {
                    info!(analysis_id = %analysis.analysis_id, "Analysis created");
                    json_response(
                        201,
                        &CreateAnalysisResponse {
                            analysis_id: analysis.analysis_id,
                            status: analysis.status,
                            created_at: analysis.created_at,
                        },
                    )
                }
                Err(e) => error_response(e),
            }
        }

        // GET /analyses - List analyses
        ("GET", "/analyses") => {
            let query = event.query_string_parameters();
            let limit = match parse_limit(query.first("limit")) {
                Ok(limit) => limit,
                Err(e) => return error_response(e),
            };
            let next_token = query.first("nextToken").map(|s| s.to_string());

            match store.list(limit, next_token.as_deref()).await {
                Ok(page) => {
                    info!(
                        item_count = page.items.len(),
                        has_next_token = page.next_token.is_some(),
                        "Listed analyses"
                    );
                    json_response(
                        200,
                        &ListAnalysesResponse {
                            items: page.items,
                            fetched_at: Utc::now(),
                            next_token: page.next_token,
                        },
                    )
                }
                Err(e) => error_response(e),
            }
        }

        // POST /documents/get-url - Presigned download URL
        ("POST", "/documents/get-url") => {
            let req: DocumentUrlRequest = match parse_body(&event) {
                Ok(req) => req,
                Err(e) => return error_response(e),
            };
            if req.object_key.is_empty() {
                return error_response(Error::Validation(
                    "objectKey must not be empty".to_string(),
                ));
            }

            let bucket = match bucket_name() {
                Ok(bucket) => bucket,
                Err(e) => return error_response(e),
            };
            let s3_client = aws_sdk_s3::Client::new(&config);

            match presign::download_url(&s3_client, &bucket, &req.object_key).await {
                Ok(url) => json_response(
                    200,
                    &DocumentUrlResponse {
                        url,
                        expires_in: presign::DOWNLOAD_EXPIRY_SECS,
                    },
                ),
                Err(e) => error_response(e),
            }
        }

        // POST /analyses/{analysis_id}/upload-urls - Presigned upload URLs
        ("POST", p) if p.ends_with("/upload-urls") => {
            let analysis_id = analysis_id.ok_or("Missing analysis_id")?;
            if let Err(e) = validate_analysis_id(&analysis_id) {
                return error_response(e);
            }

            let req: UploadUrlsRequest = match parse_body(&event) {
                Ok(req) => req,
                Err(e) => return error_response(e),
            };
            if req.file_count < 1 {
                return error_response(Error::Validation(
                    "fileCount must be at least 1".to_string(),
                ));
            }

            let bucket = match bucket_name() {
                Ok(bucket) => bucket,
                Err(e) => return error_response(e),
            };
            let s3_client = aws_sdk_s3::Client::new(&config);

            let mut urls = Vec::with_capacity(req.file_count as usize);
            for _ in 0..req.file_count {
                let key = format!("{}/{}.pdf", analysis_id, Uuid::new_v4());
                match presign::upload_url(&s3_client, &bucket, &key).await {
                    Ok(url) => urls.push(PresignedUpload { url, key }),
                    Err(e) => return error_response(e),
                }
            }

            info!(analysis_id = %analysis_id, url_count = urls.len(), "Generated presigned URLs");

            json_response(
                200,
                &UploadUrlsResponse {
                    urls,
                    expires_in: presign::UPLOAD_EXPIRY_SECS,
                    generated_at: Utc::now(),
                },
            )
        }

        // POST /analyses/{analysis_id}/start - Start the analysis workflow
        ("POST", p) if p.ends_with("/start") => {
            let analysis_id = analysis_id.ok_or("Missing analysis_id")?;
            if let Err(e) = validate_analysis_id(&analysis_id) {
                return error_response(e);
            }

            let req: StartAnalysisRequest = match parse_body(&event) {
                Ok(req) => req,
                Err(e) => return error_response(e),
            };
            if req.object_keys.is_empty() {
                return error_response(Error::Validation(
                    "objectKeys must be a non-empty array".to_string(),
                ));
            }

            let analysis = match store.get(&analysis_id).await {
                Ok(analysis) => analysis,
                Err(e) => return error_response(e),
            };
            if analysis.status != AnalysisStatus::Created {
                return error_response(Error::Validation(format!(
                    "Analysis cannot be started in status: {}",
                    analysis.status.as_str()
                )));
            }

            let objects_data: Vec<ObjectData> = req
                .object_keys
                .iter()
                .map(|key| ObjectData::skeleton(key.as_str()))
                .collect();
            let update = AnalysisUpdate {
                status: Some(AnalysisStatus::Started),
                objects_data: Some(objects_data),
                ..Default::default()
            };

            match store.update(&analysis_id, update).await {
                Ok(updated) => {
                    info!(
                        analysis_id = %analysis_id,
                        object_count = req.object_keys.len(),
                        "Analysis started"
                    );
                    let updated_at = updated.last_updated_at;
                    json_response(
                        200,
                        &StartAnalysisResponse {
                            data: updated,
                            updated_at,
                        },
                    )
                }
                Err(e) => error_response(e),
            }
        }

        // GET /analyses/{analysis_id} - Get analysis
        ("GET", p) if p.starts_with("/analyses/") => {
            let analysis_id = analysis_id.ok_or("Missing analysis_id")?;
            if let Err(e) = validate_analysis_id(&analysis_id) {
                return error_response(e);
            }

            match store.get(&analysis_id).await {
                Ok(analysis) => {
                    info!(analysis_id = %analysis_id, status = analysis.status.as_str(), "Retrieved analysis");
                    json_response(
                        200,
                        &AnalysisDetailResponse {
                            data: analysis.into(),
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

fn parse_body<T: serde::de::DeserializeOwned>(event: &Request) -> Result<T, Error> {
    let body_str = std::str::from_utf8(event.body())
        .map_err(|_| Error::Validation("Invalid UTF-8 in body".to_string()))?;
    serde_json::from_str(body_str).map_err(|e| Error::Validation(e.to_string()))
}

fn bucket_name() -> Result<String, Error> {
    std::env::var(BUCKET_NAME_ENV)
        .map_err(|_| Error::Internal(format!("{} not configured", BUCKET_NAME_ENV)))
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
