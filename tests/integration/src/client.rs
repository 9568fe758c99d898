//! Veridoc API client for testing

use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// API client for the Veridoc endpoints
pub struct VeridocClient {
    client: Client,
    base_url: String,
}

// Request/Response types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOnboardingRequest {
    pub email: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub address: String,
    pub country: String,
    pub analysis_id: String,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOnboardingResponse {
    pub unique_id: String,
    pub status: String,
    pub analysis_id: String,
    pub documents: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingDetail {
    pub request_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub status: String,
    pub analysis_id: String,
    pub documents: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingDetailResponse {
    pub data: OnboardingDetail,
    pub fetched_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSummary {
    pub request_id: String,
    pub first_name: String,
    pub email: String,
    pub country: String,
    pub status: String,
    pub created_at: String,
    pub last_updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOnboardingResponse {
    pub items: Vec<OnboardingSummary>,
    pub fetched_at: String,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisResponse {
    pub analysis_id: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetail {
    pub analysis_id: String,
    pub description: String,
    pub document_type: String,
    pub status: String,
    pub objects_data: serde_json::Value,
    pub created_at: String,
    pub last_updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetailResponse {
    pub data: AnalysisDetail,
    pub fetched_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAnalysesResponse {
    pub items: Vec<serde_json::Value>,
    pub fetched_at: String,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlsRequest {
    pub file_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresignedUpload {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlsResponse {
    pub urls: Vec<PresignedUpload>,
    pub expires_in: u64,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    pub object_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisResponse {
    pub data: serde_json::Value,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUrlRequest {
    pub object_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Result type for API responses
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// HTTP error with status code and body
    Http { status: StatusCode, body: String },
    /// Network or serialization error
    Request(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl VeridocClient {
    /// Create a new client with the given base URL
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from environment variable
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let base_url = std::env::var("VERIDOC_API_URL")
            .expect("VERIDOC_API_URL environment variable not set");
        Self::new(&base_url)
    }

    // =========================================================================
    // Onboarding Operations
    // =========================================================================

    /// Create an onboarding request
    pub async fn create_onboarding(
        &self,
        req: &CreateOnboardingRequest,
    ) -> ApiResult<CreateOnboardingResponse> {
        self.post("/onboarding", req).await
    }

    /// Get an onboarding request by ID
    pub async fn get_onboarding(&self, onboarding_id: &str) -> ApiResult<OnboardingDetailResponse> {
        self.get(&format!("/onboarding/{}", onboarding_id)).await
    }

    /// List onboarding requests
    pub async fn list_onboarding(&self, limit: Option<u32>) -> ApiResult<ListOnboardingResponse> {
        let path = match limit {
            Some(l) => format!("/onboarding?limit={}", l),
            None => "/onboarding".to_string(),
        };
        self.get(&path).await
    }

    // =========================================================================
    // Analysis Operations
    // =========================================================================

    /// Create an analysis
    pub async fn create_analysis(&self) -> ApiResult<CreateAnalysisResponse> {
        self.post("/analyses", &serde_json::json!({})).await
    }

    /// Get an analysis by ID
    pub async fn get_analysis(&self, analysis_id: &str) -> ApiResult<AnalysisDetailResponse> {
        self.get(&format!("/analyses/{}", analysis_id)).await
    }

    /// List analyses
    pub async fn list_analyses(&self, limit: Option<u32>) -> ApiResult<ListAnalysesResponse> {
        let path = match limit {
            Some(l) => format!("/analyses?limit={}", l),
            None => "/analyses".to_string(),
        };
        self.get(&path).await
    }

    /// Request presigned upload URLs
    pub async fn upload_urls(
        &self,
        analysis_id: &str,
        file_count: u32,
    ) -> ApiResult<UploadUrlsResponse> {
        self.post(
            &format!("/analyses/{}/upload-urls", analysis_id),
            &UploadUrlsRequest { file_count },
        )
        .await
    }

    /// Start an analysis over the given object keys
    pub async fn start_analysis(
        &self,
        analysis_id: &str,
        object_keys: Vec<String>,
    ) -> ApiResult<StartAnalysisResponse> {
        self.post(
            &format!("/analyses/{}/start", analysis_id),
            &StartAnalysisRequest { object_keys },
        )
        .await
    }

    /// Request a presigned download URL for a document
    pub async fn document_url(&self, object_key: &str) -> ApiResult<DocumentUrlResponse> {
        self.post(
            "/documents/get-url",
            &DocumentUrlRequest {
                object_key: object_key.to_string(),
            },
        )
        .await
    }

    // =========================================================================
    // HTTP Helpers
    // =========================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::Request(e.to_string()))
        } else {
            Err(ApiError::Http { status, body })
        }
    }
}
