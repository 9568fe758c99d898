//! Onboarding request store

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use chrono::Utc;
use serde_dynamo::{from_item, to_attribute_value, to_item};

use crate::errors::{Error, Result};
use crate::models::{NewOnboardingRequest, OnboardingRequest, OnboardingStatus};
use crate::pagination;

const TABLE_NAME_ENV: &str = "ONBOARDING_TABLE_NAME";
const DEFAULT_TABLE_NAME: &str = "veridoc-onboarding";

/// One page of a listing
pub struct OnboardingPage {
    pub items: Vec<OnboardingRequest>,
    pub next_token: Option<String>,
}

/// DynamoDB store for onboarding requests
pub struct OnboardingStore {
    client: Client,
    table_name: String,
}

impl OnboardingStore {
    /// Create a new store with the table name from the environment
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var(TABLE_NAME_ENV).unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());
        Self { client, table_name }
    }

    /// Create with explicit table name (for testing)
    pub fn with_table_name(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// Create a new onboarding request
    pub async fn create(&self, data: NewOnboardingRequest) -> Result<OnboardingRequest> {
        let request = OnboardingRequest::new(data);

        let item: HashMap<String, AttributeValue> =
            to_item(&request).map_err(|e| Error::DynamoSerialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(request)
    }

    /// Get an onboarding request by ID
    pub async fn get(&self, unique_id: &str) -> Result<OnboardingRequest> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(format!("REQUEST#{}", unique_id)))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        match result.item {
            Some(item) => from_item(item).map_err(|e| Error::DynamoSerialization(e.to_string())),
            None => Err(Error::OnboardingNotFound(unique_id.to_string())),
        }
    }

    /// Update the status of an onboarding request
    pub async fn update_status(
        &self,
        unique_id: &str,
        status: OnboardingStatus,
    ) -> Result<OnboardingRequest> {
        let status_value: AttributeValue =
            to_attribute_value(status).map_err(|e| Error::DynamoSerialization(e.to_string()))?;

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(format!("REQUEST#{}", unique_id)))
            .update_expression("SET #status = :status, updatedAt = :updatedAt")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":status", status_value)
            .expression_attribute_values(
                ":updatedAt",
                AttributeValue::S(Utc::now().to_rfc3339()),
            )
            .condition_expression("attribute_exists(pk)")
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("ConditionalCheckFailed") {
                    Error::OnboardingNotFound(unique_id.to_string())
                } else {
                    Error::Database(e.to_string())
                }
            })?;

        let attrs = result
            .attributes
            .ok_or_else(|| Error::Internal("No attributes returned".to_string()))?;
        from_item(attrs).map_err(|e| Error::DynamoSerialization(e.to_string()))
    }

    /// List onboarding requests with an opaque pagination token
    pub async fn list(&self, limit: i32, next_token: Option<&str>) -> Result<OnboardingPage> {
        let exclusive_start_key = next_token.map(pagination::decode_token).transpose()?;

        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("begins_with(pk, :prefix)")
            .expression_attribute_values(":prefix", AttributeValue::S("REQUEST#".to_string()))
            .limit(limit)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let items: Vec<OnboardingRequest> = result
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| from_item(item).ok())
            .collect();

        let next_token = result
            .last_evaluated_key
            .as_ref()
            .map(pagination::encode_token)
            .transpose()?;

        Ok(OnboardingPage { items, next_token })
    }
}
