//! Analysis store
//!
//! Listings run against the `createdAtIndex` GSI (hash key `yearMonth`,
//! range key `createdAt`), newest first. A short page from the current month
//! is topped up from the previous month.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use chrono::Utc;
use serde_dynamo::{from_item, to_attribute_value, to_item};

use crate::errors::{Error, Result};
use crate::models::{
    year_month, Analysis, AnalysisParameters, AnalysisResult, AnalysisStatus, DocumentKind,
    ObjectData, PageData,
};
use crate::pagination;

const TABLE_NAME_ENV: &str = "ANALYSIS_TABLE_NAME";
const DEFAULT_TABLE_NAME: &str = "veridoc-analysis";
const CREATED_AT_INDEX: &str = "createdAtIndex";

/// Field updates applied to an analysis; unset fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct AnalysisUpdate {
    pub status: Option<AnalysisStatus>,
    pub objects_data: Option<Vec<ObjectData>>,
    pub task_token: Option<String>,
    pub analysis_parameters: Option<AnalysisParameters>,
    pub analysis_results: Option<Vec<AnalysisResult>>,
}

/// One page of a listing
pub struct AnalysisPage {
    pub items: Vec<Analysis>,
    pub next_token: Option<String>,
}

/// DynamoDB store for analyses
pub struct AnalysisStore {
    client: Client,
    table_name: String,
}

impl AnalysisStore {
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

    /// Create a new analysis
    pub async fn create(
        &self,
        description: String,
        document_type: DocumentKind,
    ) -> Result<Analysis> {
        let analysis = Analysis::new(description, document_type);

        let item: HashMap<String, AttributeValue> =
            to_item(&analysis).map_err(|e| Error::DynamoSerialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(analysis)
    }

    /// Get an analysis by ID
    pub async fn get(&self, analysis_id: &str) -> Result<Analysis> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(format!("ID#{}", analysis_id)))
            .key("sk", AttributeValue::S("METADATA".to_string()))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        match result.item {
            Some(item) => from_item(item).map_err(|e| Error::DynamoSerialization(e.to_string())),
            None => Err(Error::AnalysisNotFound(analysis_id.to_string())),
        }
    }

    /// Apply field updates to an analysis
    ///
    /// `lastUpdatedAt` is always refreshed.
    pub async fn update(&self, analysis_id: &str, update: AnalysisUpdate) -> Result<Analysis> {
        let mut clauses = vec!["lastUpdatedAt = :lastUpdatedAt".to_string()];
        let mut names: HashMap<String, String> = HashMap::new();
        let mut values: HashMap<String, AttributeValue> = HashMap::new();
        values.insert(
            ":lastUpdatedAt".to_string(),
            AttributeValue::S(Utc::now().to_rfc3339()),
        );

        if let Some(status) = update.status {
            clauses.push("#status = :status".to_string());
            names.insert("#status".to_string(), "status".to_string());
            values.insert(
                ":status".to_string(),
                to_attribute_value(status).map_err(|e| Error::DynamoSerialization(e.to_string()))?,
            );
        }
        if let Some(objects_data) = &update.objects_data {
            clauses.push("objectsData = :objectsData".to_string());
            values.insert(
                ":objectsData".to_string(),
                to_attribute_value(objects_data)
                    .map_err(|e| Error::DynamoSerialization(e.to_string()))?,
            );
        }
        if let Some(task_token) = &update.task_token {
            clauses.push("taskToken = :taskToken".to_string());
            values.insert(
                ":taskToken".to_string(),
                AttributeValue::S(task_token.clone()),
            );
        }
        if let Some(parameters) = &update.analysis_parameters {
            clauses.push("analysisParameters = :analysisParameters".to_string());
            values.insert(
                ":analysisParameters".to_string(),
                to_attribute_value(parameters)
                    .map_err(|e| Error::DynamoSerialization(e.to_string()))?,
            );
        }
        if let Some(results) = &update.analysis_results {
            clauses.push("analysisResults = :analysisResults".to_string());
            values.insert(
                ":analysisResults".to_string(),
                to_attribute_value(results)
                    .map_err(|e| Error::DynamoSerialization(e.to_string()))?,
            );
        }

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(format!("ID#{}", analysis_id)))
            .key("sk", AttributeValue::S("METADATA".to_string()))
            .update_expression(format!("SET {}", clauses.join(", ")))
            .set_expression_attribute_names((!names.is_empty()).then_some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(pk)")
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("ConditionalCheckFailed") {
                    Error::AnalysisNotFound(analysis_id.to_string())
                } else {
                    Error::Database(e.to_string())
                }
            })?;

        let attrs = result
            .attributes
            .ok_or_else(|| Error::Internal("No attributes returned".to_string()))?;
        from_item(attrs).map_err(|e| Error::DynamoSerialization(e.to_string()))
    }

    /// Update only the analysis status
    pub async fn set_status(&self, analysis_id: &str, status: AnalysisStatus) -> Result<Analysis> {
        self.update(
            analysis_id,
            AnalysisUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Store extracted content for one page of one object
    ///
    /// Upserts the page entry and recomputes the per-object token totals.
    pub async fn update_page_content(
        &self,
        analysis_id: &str,
        object_key: &str,
        page_number: u32,
        content: String,
        token_input: u64,
        token_output: u64,
    ) -> Result<Analysis> {
        let mut analysis = self.get(analysis_id).await?;

        let object = analysis
            .objects_data
            .iter_mut()
            .find(|o| o.object == object_key)
            .ok_or_else(|| Error::ObjectNotFound(object_key.to_string()))?;

        match object.data.iter_mut().find(|p| p.page == page_number) {
            Some(page) => {
                page.content = content;
                page.token_input = token_input;
                page.token_output = token_output;
            }
            None => object.data.push(PageData {
                page: page_number,
                content,
                token_input,
                token_output,
            }),
        }

        object.token_input = Some(object.data.iter().map(|p| p.token_input).sum());
        object.token_output = Some(object.data.iter().map(|p| p.token_output).sum());

        self.update(
            analysis_id,
            AnalysisUpdate {
                objects_data: Some(analysis.objects_data),
                ..Default::default()
            },
        )
        .await
    }

    /// List analyses newest-first, current month then previous month
    pub async fn list(&self, limit: i32, next_token: Option<&str>) -> Result<AnalysisPage> {
        let current_month = year_month(Utc::now());
        let exclusive_start_key = next_token.map(pagination::decode_token).transpose()?;

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(CREATED_AT_INDEX)
            .key_condition_expression("yearMonth = :ym")
            .expression_attribute_values(":ym", AttributeValue::S(current_month.clone()))
            .scan_index_forward(false)
            .limit(limit)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut items: Vec<Analysis> = result
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| from_item(item).ok())
            .collect();
        let mut last_evaluated_key = result.last_evaluated_key;

        // Fill a short page from the previous month
        if (items.len() as i32) < limit && last_evaluated_key.is_none() {
            let remaining = limit - items.len() as i32;
            let previous = previous_month(&current_month);

            let prev_result = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(CREATED_AT_INDEX)
                .key_condition_expression("yearMonth = :ym")
                .expression_attribute_values(":ym", AttributeValue::S(previous))
                .scan_index_forward(false)
                .limit(remaining)
                .send()
                .await
                .map_err(|e| Error::Database(e.to_string()))?;

            let prev_items: Vec<Analysis> = prev_result
                .items
                .unwrap_or_default()
                .into_iter()
                .filter_map(|item| from_item(item).ok())
                .collect();
            items.extend(prev_items.into_iter().take(remaining as usize));

            if prev_result.last_evaluated_key.is_some() && items.len() as i32 == limit {
                last_evaluated_key = prev_result.last_evaluated_key;
            }
        }

        let next_token = last_evaluated_key
            .as_ref()
            .map(pagination::encode_token)
            .transpose()?;

        Ok(AnalysisPage { items, next_token })
    }
}

/// Previous `YYYY-MM` bucket
fn previous_month(current: &str) -> String {
    let mut parts = current.splitn(2, '-');
    let year: i32 = parts.next().and_then(|y| y.parse().ok()).unwrap_or(1970);
    let month: u32 = parts.next().and_then(|m| m.parse().ok()).unwrap_or(1);

    if month == 1 {
        format!("{}-12", year - 1)
    } else {
        format!("{}-{:02}", year, month - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_month() {
        assert_eq!(previous_month("2025-03"), "2025-02");
        assert_eq!(previous_month("2025-10"), "2025-09");
    }

    #[test]
    fn test_previous_month_wraps_year() {
        assert_eq!(previous_month("2025-01"), "2024-12");
    }
}
