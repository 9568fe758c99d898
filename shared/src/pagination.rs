//! Opaque pagination tokens
//!
//! A `nextToken` is the URL-safe base64 encoding of the serialized
//! `LastEvaluatedKey` returned by DynamoDB. Tokens are opaque to clients
//! and fed back verbatim as `ExclusiveStartKey`.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::errors::{Error, Result};

/// Encode a `LastEvaluatedKey` as an opaque token
pub fn encode_token(key: &HashMap<String, AttributeValue>) -> Result<String> {
    let plain: HashMap<String, serde_dynamo::AttributeValue> = key
        .iter()
        .map(|(k, v)| (k.clone(), v.clone().into()))
        .collect();
    let json = serde_json::to_string(&plain)?;
    Ok(URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Decode an opaque token back into an `ExclusiveStartKey`
pub fn decode_token(token: &str) -> Result<HashMap<String, AttributeValue>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| Error::InvalidToken("invalid base64".to_string()))?;
    let json = std::str::from_utf8(&bytes)
        .map_err(|_| Error::InvalidToken("invalid UTF-8".to_string()))?;
    let plain: HashMap<String, serde_dynamo::AttributeValue> =
        serde_json::from_str(json).map_err(|_| Error::InvalidToken("invalid JSON".to_string()))?;
    Ok(plain.into_iter().map(|(k, v)| (k, v.into())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let mut key = HashMap::new();
        key.insert("pk".to_string(), AttributeValue::S("ID#abc".to_string()));
        key.insert("sk".to_string(), AttributeValue::S("METADATA".to_string()));

        let token = encode_token(&key).unwrap();
        let decoded = decode_token(&token).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(
            decoded.get("pk"),
            Some(&AttributeValue::S("ID#abc".to_string()))
        );
    }

    #[test]
    fn test_token_is_url_safe() {
        let mut key = HashMap::new();
        key.insert(
            "pk".to_string(),
            AttributeValue::S("REQUEST#??>>".to_string()),
        );

        let token = encode_token(&key).unwrap();
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(matches!(
            decode_token("not base64!!"),
            Err(Error::InvalidToken(_))
        ));
        // Valid base64, not JSON
        let garbage = URL_SAFE_NO_PAD.encode(b"hello");
        assert!(matches!(
            decode_token(&garbage),
            Err(Error::InvalidToken(_))
        ));
    }
}
