//! Queue delivery signature verification
//!
//! QStash signs every delivery with an `Upstash-Signature` header: an HS256
//! JWT whose `body` claim is the base64url SHA-256 of the request body. Two
//! keys are valid at any time so keys can be rotated without downtime.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::AppState;

pub const SIGNATURE_HEADER: &str = "upstash-signature";
const SIGNATURE_ISSUER: &str = "Upstash";
const MAX_JOB_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct DeliveryClaims {
    pub iss: String,
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub nbf: Option<u64>,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub jti: Option<String>,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("missing Upstash-Signature header")]
    Missing,

    #[error("invalid signature: {0}")]
    Invalid(String),

    #[error("signed for {0}, not this endpoint")]
    UrlMismatch(String),

    #[error("body hash does not match signature")]
    BodyMismatch,
}

pub struct SignatureVerifier {
    current_key: String,
    next_key: Option<String>,
    expected_url: Option<String>,
}

impl SignatureVerifier {
    pub fn new(current_key: impl Into<String>, next_key: Option<String>) -> Self {
        Self {
            current_key: current_key.into(),
            next_key,
            expected_url: None,
        }
    }

    /// Also require the token's subject to be this URL
    pub fn with_expected_url(mut self, url: impl Into<String>) -> Self {
        self.expected_url = Some(url.into());
        self
    }

    pub fn verify(&self, signature: Option<&str>, body: &[u8]) -> Result<(), SignatureError> {
        let token = signature.ok_or(SignatureError::Missing)?;

        let claims = match self.decode_with(&self.current_key, token) {
            Ok(claims) => claims,
            Err(current_err) => match &self.next_key {
                Some(next_key) => self.decode_with(next_key, token)?,
                None => return Err(current_err),
            },
        };

        if let Some(expected) = &self.expected_url {
            if claims.sub.trim_end_matches('/') != expected.trim_end_matches('/') {
                return Err(SignatureError::UrlMismatch(claims.sub));
            }
        }

        let body_hash = URL_SAFE_NO_PAD.encode(Sha256::digest(body));
        if claims.body.trim_end_matches('=') != body_hash {
            return Err(SignatureError::BodyMismatch);
        }

        Ok(())
    }

    fn decode_with(&self, key: &str, token: &str) -> Result<DeliveryClaims, SignatureError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SIGNATURE_ISSUER]);
        validation.validate_nbf = true;
        validation.validate_aud = false;

        decode::<DeliveryClaims>(token, &DecodingKey::from_secret(key.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| SignatureError::Invalid(e.to_string()))
    }
}

/// Rejects unsigned or tampered queue deliveries when a verifier is configured
pub async fn verify_queue_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(verifier) = state.verifier.clone() else {
        return next.run(request).await;
    };

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_JOB_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Could not read job body");
            return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
        }
    };

    let signature = parts
        .headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = verifier.verify(signature, &bytes) {
        warn!(error = %e, "Rejected queue delivery");
        return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const JOB_URL: &str = "https://relay.example.app/api/process-job";

    /// Token as QStash would sign it for `body`
    fn sign(key: &str, url: &str, body: &[u8]) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = DeliveryClaims {
            iss: SIGNATURE_ISSUER.to_string(),
            sub: url.to_string(),
            exp: now + 300,
            nbf: Some(now - 5),
            iat: Some(now),
            jti: Some("jwt_test".to_string()),
            body: URL_SAFE_NO_PAD.encode(Sha256::digest(body)),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new("current-key", Some("next-key".to_string())).with_expected_url(JOB_URL)
    }

    #[test]
    fn test_valid_signature() {
        let body = br#"{"userInput":"q","callbackUrl":"https://cb.example"}"#;
        let token = sign("current-key", JOB_URL, body);
        assert!(verifier().verify(Some(token.as_str()), body).is_ok());
    }

    #[test]
    fn test_next_key_is_accepted() {
        let body = b"{}";
        let token = sign("next-key", JOB_URL, body);
        assert!(verifier().verify(Some(token.as_str()), body).is_ok());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let body = b"{}";
        let token = sign("someone-else", JOB_URL, body);
        assert!(matches!(
            verifier().verify(Some(token.as_str()), body),
            Err(SignatureError::Invalid(_))
        ));
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let token = sign("current-key", JOB_URL, b"{\"userInput\":\"a\"}");
        assert!(matches!(
            verifier().verify(Some(token.as_str()), b"{\"userInput\":\"b\"}"),
            Err(SignatureError::BodyMismatch)
        ));
    }

    #[test]
    fn test_other_destination_is_rejected() {
        let body = b"{}";
        let token = sign("current-key", "https://elsewhere.example/hook", body);
        assert!(matches!(
            verifier().verify(Some(token.as_str()), body),
            Err(SignatureError::UrlMismatch(_))
        ));
    }

    #[test]
    fn test_missing_header_is_rejected() {
        assert!(matches!(
            verifier().verify(None, b"{}"),
            Err(SignatureError::Missing)
        ));
    }
}
