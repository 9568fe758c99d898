//! Broadcast schedule table writes
//!
//! The table is keyed by `channelId` (hash) and `startTime` (range).
//! Remarks are stamped with the write time: `"{now} - {remarks}"`.

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::Utc;

use crate::errors::{Error, Result};

const TABLE_NAME_ENV: &str = "BROADCAST_TABLE_NAME";
const DEFAULT_TABLE_NAME: &str = "veridoc-broadcasts";

/// DynamoDB store for broadcast schedule rows
pub struct BroadcastStore {
    client: Client,
    table_name: String,
}

impl BroadcastStore {
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

    /// Record the ARN of the schedule created for a row
    pub async fn set_scheduler_arn(
        &self,
        channel_id: &str,
        start_time: &str,
        scheduler_arn: &str,
    ) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("channelId", AttributeValue::S(channel_id.to_string()))
            .key("startTime", AttributeValue::S(start_time.to_string()))
            .update_expression("SET schedulerArn = :schedulerArn")
            .expression_attribute_values(
                ":schedulerArn",
                AttributeValue::S(scheduler_arn.to_string()),
            )
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Update a row's status with timestamped remarks
    pub async fn set_status(
        &self,
        channel_id: &str,
        start_time: &str,
        status: &str,
        remarks: &str,
    ) -> Result<()> {
        let stamped = format!("{} - {}", Utc::now().to_rfc3339(), remarks);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("channelId", AttributeValue::S(channel_id.to_string()))
            .key("startTime", AttributeValue::S(start_time.to_string()))
            .update_expression("SET #status = :status, remarks = :remarks")
            .expression_attribute_names("#status", "status")
            .expression_attribute_values(":status", AttributeValue::S(status.to_string()))
            .expression_attribute_values(":remarks", AttributeValue::S(stamped))
            .send()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}
