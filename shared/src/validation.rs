//! Request validation
//!
//! JSON-schema validation for the onboarding create body and format checks
//! for path parameters.

use regex::Regex;
use serde_json::{json, Value};

use crate::errors::{Error, Result};

/// Schema for POST /onboarding bodies
fn onboarding_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema",
        "type": "object",
        "required": [
            "email",
            "firstName",
            "lastName",
            "dateOfBirth",
            "phoneNumber",
            "address",
            "country",
            "analysisId",
            "documents"
        ],
        "properties": {
            "email": {
                "type": "string",
                "format": "email",
                "maxLength": 255
            },
            "firstName": {
                "type": "string",
                "minLength": 1,
                "maxLength": 100
            },
            "middleName": {
                "type": "string",
                "maxLength": 100
            },
            "lastName": {
                "type": "string",
                "minLength": 1,
                "maxLength": 100
            },
            "dateOfBirth": {
                "type": "string",
                "format": "date"
            },
            "phoneNumber": {
                "type": "string",
                "minLength": 1,
                "maxLength": 20
            },
            "address": {
                "type": "string",
                "minLength": 1,
                "maxLength": 500
            },
            "country": {
                "type": "string",
                "minLength": 2,
                "maxLength": 2,
                "pattern": "^[A-Z]{2}$"
            },
            "analysisId": {
                "type": "string",
                "pattern": "^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
                "minLength": 36,
                "maxLength": 36
            },
            "documents": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "string",
                    "minLength": 1
                }
            }
        },
        "additionalProperties": false
    })
}

/// Validate a POST /onboarding body against the request schema
pub fn validate_onboarding_body(body: &Value) -> Result<()> {
    let schema = onboarding_schema();
    let validator = jsonschema::options()
        .should_validate_formats(true)
        .build(&schema)
        .map_err(|e| Error::Internal(format!("invalid request schema: {}", e)))?;

    if let Err(e) = validator.validate(body) {
        return Err(Error::Validation(e.to_string()));
    }
    Ok(())
}

/// Validate an analysis ID path parameter (UUID format)
pub fn validate_analysis_id(analysis_id: &str) -> Result<()> {
    if analysis_id.is_empty() {
        return Err(Error::InvalidAnalysisId("analysis ID is required".to_string()));
    }

    let pattern =
        Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("valid UUID regex");
    if !pattern.is_match(analysis_id) {
        return Err(Error::InvalidAnalysisId(format!(
            "not a valid UUID: {}",
            analysis_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> Value {
        json!({
            "email": "jane@example.com",
            "firstName": "Jane",
            "lastName": "Doe",
            "dateOfBirth": "1990-04-01",
            "phoneNumber": "+14155550100",
            "address": "1 Main St",
            "country": "US",
            "analysisId": "3c6e52cc-5a8a-4b18-9a3c-7b1f6f4d8e21",
            "documents": ["3c6e52cc/doc.pdf"]
        })
    }

    #[test]
    fn test_valid_body_accepted() {
        assert!(validate_onboarding_body(&valid_body()).is_ok());
    }

    #[test]
    fn test_missing_email_rejected() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("email");
        assert!(validate_onboarding_body(&body).is_err());
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut body = valid_body();
        body["email"] = json!("not-an-email");
        assert!(validate_onboarding_body(&body).is_err());
    }

    #[test]
    fn test_lowercase_country_rejected() {
        let mut body = valid_body();
        body["country"] = json!("us");
        assert!(validate_onboarding_body(&body).is_err());
    }

    #[test]
    fn test_empty_documents_rejected() {
        let mut body = valid_body();
        body["documents"] = json!([]);
        assert!(validate_onboarding_body(&body).is_err());
    }

    #[test]
    fn test_extra_property_rejected() {
        let mut body = valid_body();
        body["assignedTo"] = json!("somebody");
        assert!(validate_onboarding_body(&body).is_err());
    }

    #[test]
    fn test_non_v4_analysis_id_rejected() {
        let mut body = valid_body();
        // version nibble is 1, not 4
        body["analysisId"] = json!("3c6e52cc-5a8a-1b18-9a3c-7b1f6f4d8e21");
        assert!(validate_onboarding_body(&body).is_err());
    }

    #[test]
    fn test_analysis_id_path_check() {
        assert!(validate_analysis_id("3c6e52cc-5a8a-4b18-9a3c-7b1f6f4d8e21").is_ok());
        assert!(validate_analysis_id("3C6E52CC-5A8A-4B18-9A3C-7B1F6F4D8E21").is_ok());
        assert!(validate_analysis_id("").is_err());
        assert!(validate_analysis_id("not-a-uuid").is_err());
    }
}
