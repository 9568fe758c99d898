//! Domain models for Veridoc
//!
//! These types represent the core entities in the system:
//! - Onboarding requests: KYC applications with identity data and documents
//! - Analyses: document-analysis jobs with per-page extraction state
//! - Prompts: prompt-library items
//! - API request/response shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an onboarding request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStatus {
    New,
    Checking,
    ReadyToCheck,
    Approved,
    Rejected,
    Clarification,
}

impl OnboardingStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStatus::New => "NEW",
            OnboardingStatus::Checking => "CHECKING",
            OnboardingStatus::ReadyToCheck => "READY_TO_CHECK",
            OnboardingStatus::Approved => "APPROVED",
            OnboardingStatus::Rejected => "REJECTED",
            OnboardingStatus::Clarification => "CLARIFICATION",
        }
    }
}

/// Lifecycle of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Created,
    Started,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Created => "CREATED",
            AnalysisStatus::Started => "STARTED",
            AnalysisStatus::Completed => "COMPLETED",
            AnalysisStatus::Failed => "FAILED",
        }
    }
}

/// Document classification for an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Mixed,
    BankStatement,
    AnnualReport,
}

/// Prompt-library item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptKind {
    System,
    User,
    Assistant,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Human,
    Assistant,
}

/// A message in an analysis chat history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Onboarding request item
///
/// Stored with `pk = REQUEST#{uniqueId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub pk: String,
    pub unique_id: String,
    pub email: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub address: String,
    /// ISO-3166 alpha-2, stored uppercased
    pub country: String,
    pub analysis_id: String,
    pub documents: Vec<String>,
    pub status: OnboardingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OnboardingRequest {
    pub fn new(data: NewOnboardingRequest) -> Self {
        let unique_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        Self {
            pk: format!("REQUEST#{}", unique_id),
            unique_id,
            email: data.email,
            first_name: data.first_name,
            middle_name: data.middle_name,
            last_name: data.last_name,
            date_of_birth: data.date_of_birth,
            phone_number: data.phone_number,
            address: data.address,
            country: data.country.to_uppercase(),
            analysis_id: data.analysis_id,
            documents: data.documents,
            status: OnboardingStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of POST /onboarding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOnboardingRequest {
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub address: String,
    pub country: String,
    pub analysis_id: String,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOnboardingResponse {
    pub unique_id: String,
    pub status: OnboardingStatus,
    pub analysis_id: String,
    pub documents: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Full onboarding request as returned by GET /onboarding/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingDetail {
    pub request_id: String,
    pub email: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub address: String,
    pub country: String,
    pub status: OnboardingStatus,
    pub analysis_id: String,
    pub documents: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OnboardingRequest> for OnboardingDetail {
    fn from(item: OnboardingRequest) -> Self {
        Self {
            request_id: item.unique_id,
            email: item.email,
            first_name: item.first_name,
            middle_name: item.middle_name,
            last_name: item.last_name,
            date_of_birth: item.date_of_birth,
            phone_number: item.phone_number,
            address: item.address,
            country: item.country,
            status: item.status,
            analysis_id: item.analysis_id,
            documents: item.documents,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingDetailResponse {
    pub data: OnboardingDetail,
    pub fetched_at: DateTime<Utc>,
}

/// Projection used by GET /onboarding listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSummary {
    pub request_id: String,
    pub first_name: String,
    pub email: String,
    pub country: String,
    pub status: OnboardingStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl From<OnboardingRequest> for OnboardingSummary {
    fn from(item: OnboardingRequest) -> Self {
        Self {
            request_id: item.unique_id,
            first_name: item.first_name,
            email: item.email,
            country: item.country,
            status: item.status,
            created_at: item.created_at,
            last_updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOnboardingResponse {
    pub items: Vec<OnboardingSummary>,
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Extraction state for one page of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub page: u32,
    pub content: String,
    pub token_input: u64,
    pub token_output: u64,
}

/// Extraction state for one uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    /// S3 object key
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u32>,
    #[serde(default)]
    pub data: Vec<PageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_input: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_output: Option<u64>,
}

impl ObjectData {
    /// Empty extraction skeleton for an object key
    pub fn skeleton(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            number_of_pages: None,
            data: Vec::new(),
            token_input: None,
            token_output: None,
        }
    }
}

/// Identity fields carried from the onboarding request into the analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub onboarding_id: String,
}

/// Result of one model analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Name of the prompt that produced the result
    pub analysis: String,
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    pub input_token: u64,
    pub output_token: u64,
}

/// Analysis item
///
/// Stored with `pk = ID#{analysisId}`, `sk = METADATA`. The `yearMonth`
/// attribute is the hash key of the `createdAtIndex` GSI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub pk: String,
    pub sk: String,
    pub analysis_id: String,
    pub description: String,
    pub document_type: DocumentKind,
    pub objects_data: Vec<ObjectData>,
    pub chat_history: Vec<ChatMessage>,
    pub status: AnalysisStatus,
    pub year_month: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_parameters: Option<AnalysisParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_results: Option<Vec<AnalysisResult>>,
}

impl Analysis {
    pub fn new(description: String, document_type: DocumentKind) -> Self {
        let analysis_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        Self {
            pk: format!("ID#{}", analysis_id),
            sk: "METADATA".to_string(),
            analysis_id,
            description,
            document_type,
            objects_data: Vec::new(),
            chat_history: Vec::new(),
            status: AnalysisStatus::Created,
            year_month: year_month(now),
            created_at: now,
            last_updated_at: now,
            task_token: None,
            analysis_parameters: None,
            analysis_results: None,
        }
    }
}

/// `YYYY-MM` bucket for the listing GSI
pub fn year_month(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

/// Full analysis as returned by GET /analyses/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetail {
    pub analysis_id: String,
    pub description: String,
    pub document_type: DocumentKind,
    pub objects_data: Vec<ObjectData>,
    pub chat_history: Vec<ChatMessage>,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_parameters: Option<AnalysisParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_results: Option<Vec<AnalysisResult>>,
}

impl From<Analysis> for AnalysisDetail {
    fn from(item: Analysis) -> Self {
        Self {
            analysis_id: item.analysis_id,
            description: item.description,
            document_type: item.document_type,
            objects_data: item.objects_data,
            chat_history: item.chat_history,
            status: item.status,
            created_at: item.created_at,
            last_updated_at: item.last_updated_at,
            analysis_parameters: item.analysis_parameters,
            analysis_results: item.analysis_results,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetailResponse {
    pub data: AnalysisDetail,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisResponse {
    pub analysis_id: String,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAnalysesResponse {
    pub items: Vec<Analysis>,
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Body of POST /analyses/{id}/upload-urls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlsRequest {
    pub file_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlsResponse {
    pub urls: Vec<PresignedUpload>,
    pub expires_in: u64,
    pub generated_at: DateTime<Utc>,
}

/// Body of POST /analyses/{id}/start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisRequest {
    pub object_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAnalysisResponse {
    pub data: Analysis,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST /documents/get-url
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUrlRequest {
    pub object_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

/// Body of POST /onboarding/email/generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateEmailRequest {
    pub issue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEmailResponse {
    pub content: String,
    /// Empty string when the model produced no thinking block
    pub thinking: String,
    pub input_token: u64,
    pub output_token: u64,
}

/// Prompt-library item, keyed by prompt ID
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub pk: String,
    #[serde(rename = "type")]
    pub kind: PromptKind,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Prompt {
    pub fn new(prompt_id: String, kind: PromptKind, content: String, metadata: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            pk: prompt_id,
            kind,
            content,
            metadata,
            created_at: now,
            last_updated_at: now,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_onboarding_request_new() {
        let req = OnboardingRequest::new(NewOnboardingRequest {
            email: "jane@example.com".into(),
            first_name: "Jane".into(),
            middle_name: None,
            last_name: "Doe".into(),
            date_of_birth: "1990-04-01".into(),
            phone_number: "+14155550100".into(),
            address: "1 Main St".into(),
            country: "us".into(),
            analysis_id: "3c6e52cc-5a8a-4b18-9a3c-7b1f6f4d8e21".into(),
            documents: vec!["doc.pdf".into()],
        });

        assert_eq!(req.pk, format!("REQUEST#{}", req.unique_id));
        assert_eq!(req.country, "US");
        assert_eq!(req.status, OnboardingStatus::New);
        assert_eq!(req.created_at, req.updated_at);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OnboardingStatus::ReadyToCheck).unwrap(),
            r#""READY_TO_CHECK""#
        );
        assert_eq!(
            serde_json::to_string(&DocumentKind::BankStatement).unwrap(),
            r#""BANK_STATEMENT""#
        );
        assert_eq!(
            serde_json::to_string(&ChatRole::Human).unwrap(),
            r#""human""#
        );
    }

    #[test]
    fn test_analysis_new() {
        let analysis = Analysis::new(String::new(), DocumentKind::Mixed);
        assert_eq!(analysis.pk, format!("ID#{}", analysis.analysis_id));
        assert_eq!(analysis.sk, "METADATA");
        assert_eq!(analysis.status, AnalysisStatus::Created);
        assert!(analysis.objects_data.is_empty());
        assert_eq!(analysis.year_month, year_month(analysis.created_at));
    }

    #[test]
    fn test_year_month_format() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(year_month(ts), "2025-03");
    }

    #[test]
    fn test_object_data_defaults() {
        let json = r#"{"object": "abc/def.pdf"}"#;
        let data: ObjectData = serde_json::from_str(json).unwrap();
        assert_eq!(data.object, "abc/def.pdf");
        assert!(data.data.is_empty());
        assert!(data.number_of_pages.is_none());
    }

    #[test]
    fn test_error_body() {
        let err = ErrorBody::new("validation_error", "email is required");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("validation_error"));
        assert!(!json.contains("details"));
    }
}
