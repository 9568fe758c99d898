//! Broadcast scheduling domain logic
//!
//! Pure validation and shaping for the broadcast pipeline: record checks,
//! schedule naming, one-shot schedule expressions and the lead-time offset.
//! Status strings are those written to the broadcast table.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_ERROR: &str = "Error";
pub const STATUS_HEALTHY: &str = "Healthy";
pub const STATUS_UNHEALTHY: &str = "Unhealthy";

const LEAD_MINUTES_ENV: &str = "LEAD_MINUTES";
const DEFAULT_LEAD_MINUTES: i64 = 10;

/// A broadcast row as carried through the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRecord {
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
}

/// Parse an ISO-8601 timestamp, with or without a zone designator
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn is_valid_channel_id(channel_id: &str) -> bool {
    Regex::new(r"^\d+$")
        .expect("valid channel regex")
        .is_match(channel_id)
}

fn is_valid_manifest_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    let lowered = url.to_lowercase();
    lowered.ends_with(".mpd") || lowered.ends_with(".m3u8")
}

/// Field checks needed before a schedule can be created
pub fn validate_for_schedule(record: &BroadcastRecord) -> std::result::Result<(), String> {
    if record.channel_id.is_empty() {
        return Err("Missing required field: channelId".to_string());
    }
    if record.start_time.is_empty() {
        return Err("Missing required field: startTime".to_string());
    }
    if record.end_time.is_empty() {
        return Err("Missing required field: endTime".to_string());
    }

    if !is_valid_channel_id(&record.channel_id) {
        return Err(format!(
            "Invalid channelId format: {}. Must contain only numbers",
            record.channel_id
        ));
    }
    if parse_timestamp(&record.start_time).is_none() {
        return Err(format!(
            "Invalid startTime format: {}. Must be ISO8601",
            record.start_time
        ));
    }
    if parse_timestamp(&record.end_time).is_none() {
        return Err(format!(
            "Invalid endTime format: {}. Must be ISO8601",
            record.end_time
        ));
    }
    Ok(())
}

/// Full record validation, including the manifest URL
pub fn validate(record: &BroadcastRecord) -> std::result::Result<(), String> {
    validate_for_schedule(record)?;

    let manifest_url = record
        .manifest_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| "Missing required field: manifestUrl".to_string())?;

    if !is_valid_manifest_url(manifest_url) {
        return Err(format!(
            "Invalid manifestUrl format: {}. Must start with http(s) and end with .mpd or .m3u8",
            manifest_url
        ));
    }
    Ok(())
}

/// Scheduler-friendly name: only alphanumerics, hyphens, underscores and
/// periods survive, so `+` becomes `-plus-` and `:` becomes `-`
pub fn schedule_name(record: &BroadcastRecord) -> String {
    let start_time = record.start_time.replace('+', "-plus-").replace(':', "-");
    format!("broadcast-{}-{}", record.channel_id, start_time)
}

/// One-shot EventBridge Scheduler expression, `at(YYYY-MM-DDTHH:MM:SS)` in UTC
pub fn schedule_expression(start_time: &str) -> Option<String> {
    let dt = parse_timestamp(start_time)?;
    Some(format!("at({})", dt.format("%Y-%m-%dT%H:%M:%S")))
}

/// The moment the workflow should fire: lead time before the start
pub fn schedule_time(start_time: &str, lead_minutes: i64) -> Option<DateTime<Utc>> {
    parse_timestamp(start_time).map(|dt| dt - Duration::minutes(lead_minutes))
}

/// Lead time in minutes from the environment
pub fn lead_minutes() -> i64 {
    std::env::var(LEAD_MINUTES_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LEAD_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> BroadcastRecord {
        BroadcastRecord {
            channel_id: "8812210".to_string(),
            start_time: "2025-06-01T18:00:00Z".to_string(),
            end_time: "2025-06-01T20:00:00Z".to_string(),
            manifest_url: Some("https://cdn.example.com/live/index.m3u8".to_string()),
        }
    }

    #[test]
    fn test_valid_record_passes() {
        assert!(validate(&valid_record()).is_ok());
    }

    #[test]
    fn test_missing_field_reported() {
        let mut record = valid_record();
        record.end_time = String::new();
        assert_eq!(
            validate(&record).unwrap_err(),
            "Missing required field: endTime"
        );
    }

    #[test]
    fn test_non_numeric_channel_rejected() {
        let mut record = valid_record();
        record.channel_id = "chan-1".to_string();
        assert!(validate(&record).unwrap_err().contains("channelId"));
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let mut record = valid_record();
        record.start_time = "June 1st".to_string();
        assert!(validate(&record).unwrap_err().contains("startTime"));
    }

    #[test]
    fn test_manifest_url_rules() {
        let mut record = valid_record();
        record.manifest_url = Some("ftp://cdn.example.com/live/index.m3u8".to_string());
        assert!(validate(&record).is_err());

        record.manifest_url = Some("https://cdn.example.com/live/playlist.txt".to_string());
        assert!(validate(&record).is_err());

        record.manifest_url = Some("https://cdn.example.com/live/Index.M3U8".to_string());
        assert!(validate(&record).is_ok());

        record.manifest_url = None;
        assert_eq!(
            validate(&record).unwrap_err(),
            "Missing required field: manifestUrl"
        );
    }

    #[test]
    fn test_schedule_only_validation_ignores_manifest() {
        let mut record = valid_record();
        record.manifest_url = None;
        assert!(validate_for_schedule(&record).is_ok());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2025-06-01T18:00:00Z").is_some());
        assert!(parse_timestamp("2025-06-01T18:00:00+02:00").is_some());
        assert!(parse_timestamp("2025-06-01T18:00:00").is_some());
        assert!(parse_timestamp("2025-06-01T18:00:00.500").is_some());
        assert!(parse_timestamp("2025-06-01").is_none());
    }

    #[test]
    fn test_schedule_name_sanitized() {
        let record = BroadcastRecord {
            channel_id: "42".to_string(),
            start_time: "2025-06-01T18:00:00+02:00".to_string(),
            ..Default::default()
        };
        assert_eq!(
            schedule_name(&record),
            "broadcast-42-2025-06-01T18-00-00-plus-02-00"
        );
    }

    #[test]
    fn test_schedule_expression_in_utc() {
        assert_eq!(
            schedule_expression("2025-06-01T18:00:00+02:00").unwrap(),
            "at(2025-06-01T16:00:00)"
        );
        assert_eq!(
            schedule_expression("2025-06-01T18:00:00Z").unwrap(),
            "at(2025-06-01T18:00:00)"
        );
    }

    #[test]
    fn test_schedule_time_lead_offset() {
        let fire_at = schedule_time("2025-06-01T18:00:00Z", 10).unwrap();
        assert_eq!(fire_at.format("%H:%M").to_string(), "17:50");
    }
}
