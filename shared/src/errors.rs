//! Error types for Veridoc

use thiserror::Error;

/// Result type alias using Veridoc Error
pub type Result<T> = std::result::Result<T, Error>;

/// Veridoc error types
#[derive(Error, Debug)]
pub enum Error {
    /// Onboarding request not found
    #[error("Onboarding request not found: {0}")]
    OnboardingNotFound(String),

    /// Analysis not found
    #[error("Analysis not found: {0}")]
    AnalysisNotFound(String),

    /// Prompt not found
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    /// Object key not present in the analysis
    #[error("Object not found in analysis: {0}")]
    ObjectNotFound(String),

    /// Invalid analysis ID format
    #[error("Invalid analysis ID: {0}")]
    InvalidAnalysisId(String),

    /// Invalid pagination token
    #[error("Invalid next token: {0}")]
    InvalidToken(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Model response missing the expected content
    #[error("Model response error: {0}")]
    ModelResponse(String),

    /// DynamoDB error
    #[error("Database error: {0}")]
    Database(String),

    /// JSON Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// DynamoDB serialization error
    #[error("DynamoDB serialization error: {0}")]
    DynamoSerialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::OnboardingNotFound(_) => "onboarding_not_found",
            Error::AnalysisNotFound(_) => "analysis_not_found",
            Error::PromptNotFound(_) => "prompt_not_found",
            Error::ObjectNotFound(_) => "object_not_found",
            Error::InvalidAnalysisId(_) => "invalid_analysis_id",
            Error::InvalidToken(_) => "invalid_next_token",
            Error::Validation(_) => "validation_error",
            Error::ModelResponse(_) => "model_response_error",
            Error::Database(_) => "database_error",
            Error::Serialization(_) => "serialization_error",
            Error::DynamoSerialization(_) => "serialization_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::OnboardingNotFound(_) => 404,
            Error::AnalysisNotFound(_) => 404,
            Error::PromptNotFound(_) => 404,
            Error::ObjectNotFound(_) => 404,
            Error::InvalidAnalysisId(_) => 400,
            Error::InvalidToken(_) => 400,
            Error::Validation(_) => 400,
            Error::ModelResponse(_) => 502,
            Error::Database(_) => 500,
            Error::Serialization(_) => 400,
            Error::DynamoSerialization(_) => 500,
            Error::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::AnalysisNotFound("abc".into());
        assert_eq!(err.code(), "analysis_not_found");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_error_display() {
        let err = Error::OnboardingNotFound("abc".into());
        assert_eq!(err.to_string(), "Onboarding request not found: abc");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::Validation("email is required".into());
        assert_eq!(err.code(), "validation_error");
        assert_eq!(err.status_code(), 400);
    }
}
