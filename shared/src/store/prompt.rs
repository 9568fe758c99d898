//! Prompt-library store

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use chrono::Utc;
use serde_dynamo::{from_item, to_attribute_value, to_item};

use crate::errors::{Error, Result};
use crate::models::{Prompt, PromptKind};
use crate::pagination;

const TABLE_NAME_ENV: &str = "PROMPTS_TABLE_NAME";
const DEFAULT_TABLE_NAME: &str = "veridoc-prompts";
const TYPE_INDEX: &str = "typeIndex";

/// One page of a listing
pub struct PromptPage {
    pub items: Vec<Prompt>,
    pub next_token: Option<String>,
}

/// DynamoDB store for prompt-library items
pub struct PromptStore {
    client: Client,
    table_name: String,
}

impl PromptStore {
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

    /// Store a prompt
    pub async fn create(&self, prompt: &Prompt) -> Result<Prompt> {
        let item: HashMap<String, AttributeValue> =
            to_item(prompt).map_err(|e| Error::DynamoSerialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(prompt.clone())
    }

    /// Get a prompt by ID
    pub async fn get(&self, prompt_id: &str) -> Result<Prompt> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(prompt_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        match result.item {
            Some(item) => from_item(item).map_err(|e| Error::DynamoSerialization(e.to_string())),
            None => Err(Error::PromptNotFound(prompt_id.to_string())),
        }
    }

    /// Update the content (and optionally metadata) of a prompt
    pub async fn update(
        &self,
        prompt_id: &str,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Prompt> {
        let mut expression = "SET content = :content, lastUpdatedAt = :lastUpdatedAt".to_string();
        let mut values: HashMap<String, AttributeValue> = HashMap::new();
        values.insert(":content".to_string(), AttributeValue::S(content.to_string()));
        values.insert(
            ":lastUpdatedAt".to_string(),
            AttributeValue::S(Utc::now().to_rfc3339()),
        );

        if let Some(metadata) = &metadata {
            expression.push_str(", metadata = :metadata");
            values.insert(
                ":metadata".to_string(),
                to_attribute_value(metadata)
                    .map_err(|e| Error::DynamoSerialization(e.to_string()))?,
            );
        }

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(prompt_id.to_string()))
            .update_expression(expression)
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(pk)")
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("ConditionalCheckFailed") {
                    Error::PromptNotFound(prompt_id.to_string())
                } else {
                    Error::Database(e.to_string())
                }
            })?;

        let attrs = result
            .attributes
            .ok_or_else(|| Error::Internal("No attributes returned".to_string()))?;
        from_item(attrs).map_err(|e| Error::DynamoSerialization(e.to_string()))
    }

    /// List prompts of one type via the `typeIndex` GSI
    pub async fn list_by_type(
        &self,
        kind: PromptKind,
        limit: i32,
        next_token: Option<&str>,
    ) -> Result<PromptPage> {
        let kind_value: AttributeValue =
            to_attribute_value(kind).map_err(|e| Error::DynamoSerialization(e.to_string()))?;
        let exclusive_start_key = next_token.map(pagination::decode_token).transpose()?;

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(TYPE_INDEX)
            .key_condition_expression("#type = :type")
            .expression_attribute_names("#type", "type")
            .expression_attribute_values(":type", kind_value)
            .limit(limit)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let items: Vec<Prompt> = result
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

        Ok(PromptPage { items, next_token })
    }
}
