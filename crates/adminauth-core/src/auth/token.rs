//! Compact token payload decoding
//!
//! Decodes the claims segment of a `header.payload.signature` token without
//! verifying it. Failures are reported as `None` so callers can treat an
//! undecodable token the same as a token without claims.

use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Decoded token payload: claim name to arbitrary JSON value
pub type ClaimSet = Map<String, Value>;

#[derive(Error, Debug)]
enum PayloadError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Decode the payload segment of a compact token into its claims.
///
/// Returns `None` when the token is absent, has no payload segment, or any
/// decoding step fails. Never panics.
pub fn decode_payload(token: Option<&str>) -> Option<ClaimSet> {
    let token = token.filter(|t| !t.is_empty())?;
    let payload = token.split('.').nth(1).filter(|p| !p.is_empty())?;

    match decode_segment(payload) {
        Ok(claims) => Some(claims),
        Err(e) => {
            warn!(error = %e, "Could not decode token payload");
            None
        }
    }
}

fn decode_segment(segment: &str) -> Result<ClaimSet, PayloadError> {
    // base64url -> base64, then restore the stripped padding
    let mut normalized: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let missing = (4 - normalized.len() % 4) % 4;
    normalized.extend(std::iter::repeat('=').take(missing));

    let bytes = general_purpose::STANDARD.decode(normalized.as_bytes())?;
    let text = String::from_utf8(bytes)?;

    match serde_json::from_str::<Value>(&text)? {
        Value::Object(claims) => Ok(claims),
        _ => Err(PayloadError::NotAnObject),
    }
}

/// Encode claims as an unpadded base64url payload segment
pub fn encode_payload(claims: &ClaimSet) -> String {
    let json = Value::Object(claims.clone()).to_string();
    general_purpose::URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Build an unsigned (`alg: none`) compact token carrying `claims`.
/// Only meant for local diagnostics; no verifier accepts it.
pub fn encode_unsigned(claims: &ClaimSet) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    format!("{}.{}.", header, encode_payload(claims))
}

/// Header fields worth showing when inspecting a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeaderInfo {
    pub algorithm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Read the JOSE header of a signed token, if it has one
pub fn inspect_header(token: &str) -> Option<TokenHeaderInfo> {
    let header = jsonwebtoken::decode_header(token).ok()?;
    Some(TokenHeaderInfo {
        algorithm: format!("{:?}", header.alg),
        key_id: header.kid,
        token_type: header.typ,
    })
}

/// Redacted form of an `Authorization` header value, safe to log
pub fn summarize_token(authorization: Option<&str>) -> String {
    let Some(header) = authorization else {
        return "none".to_string();
    };
    let Some(token) = header.strip_prefix("Bearer ") else {
        return "no bearer".to_string();
    };

    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 16 {
        return token.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", head, tail)
}
