//! PDF access for the extraction steps
//!
//! Documents are loaded from S3 into memory; page numbers are 1-based.

use lambda_runtime::Error as LambdaError;
use lopdf::Document;

/// Download a document from S3
pub async fn fetch_document(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<Vec<u8>, LambdaError> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| format!("failed to read s3://{}/{}: {}", bucket, key, e))?;

    let bytes = output
        .body
        .collect()
        .await
        .map_err(|e| format!("failed to buffer s3://{}/{}: {}", bucket, key, e))?
        .into_bytes();

    Ok(bytes.to_vec())
}

/// Parse a PDF from memory
pub fn load(bytes: &[u8]) -> Result<Document, LambdaError> {
    Document::load_mem(bytes).map_err(|e| format!("failed to parse PDF: {}", e).into())
}

/// Number of pages in the document
pub fn page_count(document: &Document) -> u32 {
    document.get_pages().len() as u32
}

/// Extract the text of a single page
pub fn page_text(document: &Document, page_number: u32) -> Result<String, LambdaError> {
    document
        .extract_text(&[page_number])
        .map_err(|e| format!("failed to extract text from page {}: {}", page_number, e).into())
}
