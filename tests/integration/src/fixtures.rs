//! Test fixtures and utilities

use uuid::Uuid;

use crate::client::CreateOnboardingRequest;

/// Generate a unique email for testing
pub fn unique_email() -> String {
    format!("test-{}@example.com", &Uuid::new_v4().to_string()[..8])
}

/// Generate a unique document key under an analysis
pub fn unique_document_key(analysis_id: &str) -> String {
    format!("{}/{}.pdf", analysis_id, Uuid::new_v4())
}

/// A valid onboarding payload linked to the given analysis
pub fn onboarding_payload(analysis_id: &str) -> CreateOnboardingRequest {
    CreateOnboardingRequest {
        email: unique_email(),
        first_name: "Jane".to_string(),
        middle_name: None,
        last_name: "Doe".to_string(),
        date_of_birth: "1990-04-01".to_string(),
        phone_number: "+14155550100".to_string(),
        address: "1 Main St, Springfield".to_string(),
        country: "US".to_string(),
        analysis_id: analysis_id.to_string(),
        documents: vec![unique_document_key(analysis_id)],
    }
}

/// Check if API URL is configured
pub fn api_url_configured() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("VERIDOC_API_URL").is_ok()
}

/// Skip test if API URL is not configured
#[macro_export]
macro_rules! skip_if_no_api {
    () => {
        if !$crate::fixtures::api_url_configured() {
            eprintln!("Skipping test: VERIDOC_API_URL not set");
            return;
        }
    };
}
