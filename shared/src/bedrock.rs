//! Bedrock prompt handling
//!
//! Prompt templates live in the Bedrock prompt library and are fetched by ID.
//! Model invocations go through the Anthropic messages body format; responses
//! are expected to wrap their content in `<response>` (and optionally
//! `<thinking>`) tags.

use aws_sdk_bedrockruntime::primitives::Blob;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<InvokeMessage<'a>>,
}

#[derive(Serialize)]
struct InvokeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct InvokeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Deserialize, Default)]
struct TokenUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// A prompt fetched from the Bedrock prompt library
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub text: String,
}

/// Raw model output with token usage
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Fetch a prompt template by ID
///
/// The text comes from the first variant carrying a text template
/// configuration; a prompt without one is an error.
pub async fn fetch_prompt(
    client: &aws_sdk_bedrockagent::Client,
    prompt_id: &str,
) -> Result<PromptTemplate> {
    let output = client
        .get_prompt()
        .prompt_identifier(prompt_id)
        .send()
        .await
        .map_err(|e| Error::Internal(format!("failed to fetch prompt {}: {}", prompt_id, e)))?;

    let name = output.name().to_string();
    let text = output
        .variants()
        .iter()
        .filter_map(|v| v.template_configuration())
        .filter_map(|tc| tc.as_text().ok())
        .map(|t| t.text())
        .next()
        .ok_or_else(|| {
            Error::PromptNotFound(format!("no text template in prompt {}", prompt_id))
        })?
        .to_string();

    Ok(PromptTemplate { name, text })
}

/// Invoke the model with a single user message
pub async fn invoke(
    client: &aws_sdk_bedrockruntime::Client,
    prompt: &str,
) -> Result<ModelReply> {
    let request = InvokeRequest {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens: MAX_TOKENS,
        messages: vec![InvokeMessage {
            role: "user",
            content: prompt,
        }],
    };
    let body = serde_json::to_vec(&request)?;

    let output = client
        .invoke_model()
        .model_id(MODEL_ID)
        .body(Blob::new(body))
        .send()
        .await
        .map_err(|e| Error::Internal(format!("model invocation failed: {}", e)))?;

    let parsed: InvokeResponse = serde_json::from_slice(&output.body.into_inner())?;
    let text = parsed
        .content
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or_else(|| Error::ModelResponse("empty model response".to_string()))?;

    Ok(ModelReply {
        text,
        input_tokens: parsed.usage.input_tokens,
        output_tokens: parsed.usage.output_tokens,
    })
}

/// Extract `<response>` and `<thinking>` blocks from model output
pub fn extract_tagged(text: &str) -> (Option<String>, Option<String>) {
    (
        capture_tag(text, r"(?s)<response>(.*?)</response>"),
        capture_tag(text, r"(?s)<thinking>(.*?)</thinking>"),
    )
}

fn capture_tag(text: &str, pattern: &str) -> Option<String> {
    Regex::new(pattern)
        .expect("valid tag regex")
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().trim().to_string())
}

/// Substitute `{{name}}` placeholders in a prompt template
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in vars {
        rendered = rendered.replace(&format!("{{{{{}}}}}", name), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tagged_both_blocks() {
        let text = "<thinking>\nlet me see\n</thinking>\n<response>\nDear customer,\n</response>";
        let (response, thinking) = extract_tagged(text);
        assert_eq!(response.as_deref(), Some("Dear customer,"));
        assert_eq!(thinking.as_deref(), Some("let me see"));
    }

    #[test]
    fn test_extract_tagged_missing_blocks() {
        let (response, thinking) = extract_tagged("plain output");
        assert!(response.is_none());
        assert!(thinking.is_none());
    }

    #[test]
    fn test_extract_tagged_multiline() {
        let text = "<response>line one\n\nline two</response>";
        let (response, _) = extract_tagged(text);
        assert_eq!(response.as_deref(), Some("line one\n\nline two"));
    }

    #[test]
    fn test_render_substitution() {
        let rendered = render(
            "Issue: {{issue}}\nDocs: {{document}}",
            &[("issue", "login fails"), ("document", "none")],
        );
        assert_eq!(rendered, "Issue: login fails\nDocs: none");
    }

    #[test]
    fn test_render_unknown_placeholder_left_alone() {
        let rendered = render("Hello {{name}}", &[("other", "x")]);
        assert_eq!(rendered, "Hello {{name}}");
    }

    #[test]
    fn test_invoke_request_shape() {
        let request = InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: MAX_TOKENS,
            messages: vec![InvokeMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
