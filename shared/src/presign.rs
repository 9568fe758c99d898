//! Presigned S3 URLs for document upload and download

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;

use crate::errors::{Error, Result};

/// Upload URLs are valid for one hour
pub const UPLOAD_EXPIRY_SECS: u64 = 3600;
/// Download URLs are short-lived
pub const DOWNLOAD_EXPIRY_SECS: u64 = 60;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Presigned PUT for uploading a PDF document
pub async fn upload_url(client: &aws_sdk_s3::Client, bucket: &str, key: &str) -> Result<String> {
    let config = PresigningConfig::expires_in(Duration::from_secs(UPLOAD_EXPIRY_SECS))
        .map_err(|e| Error::Internal(e.to_string()))?;

    let presigned = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_type(PDF_CONTENT_TYPE)
        .presigned(config)
        .await
        .map_err(|e| Error::Internal(format!("failed to presign upload: {}", e)))?;

    Ok(presigned.uri().to_string())
}

/// Presigned GET for reading a stored document
pub async fn download_url(client: &aws_sdk_s3::Client, bucket: &str, key: &str) -> Result<String> {
    let config = PresigningConfig::expires_in(Duration::from_secs(DOWNLOAD_EXPIRY_SECS))
        .map_err(|e| Error::Internal(e.to_string()))?;

    let presigned = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .presigned(config)
        .await
        .map_err(|e| Error::Internal(format!("failed to presign download: {}", e)))?;

    Ok(presigned.uri().to_string())
}
