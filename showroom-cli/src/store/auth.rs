//! OAuth2 access tokens for service accounts (JWT bearer grant)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::debug;
use serde::{Deserialize, Serialize};

use super::credentials::ServiceAccountKey;
use crate::error::StoreError;

pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion (Google caps it at one hour)
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Bearer token for API calls
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Sign the JWT assertion sent to the token endpoint
pub fn build_assertion(
    key: &ServiceAccountKey,
    token_uri: &str,
    now: DateTime<Utc>,
) -> Result<String, StoreError> {
    let claims = Claims {
        iss: &key.client_email,
        scope: BIGQUERY_SCOPE,
        aud: token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StoreError::Auth(format!("invalid private key: {}", e)))?;

    encode(&header, &claims, &encoding_key)
        .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {}", e)))
}

/// Exchanges service-account keys for access tokens
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    http: reqwest::Client,
    token_uri_override: Option<String>,
}

impl TokenExchanger {
    pub fn new(http: reqwest::Client, token_uri_override: Option<String>) -> Self {
        Self {
            http,
            token_uri_override,
        }
    }

    pub async fn exchange(&self, key: &ServiceAccountKey) -> Result<AccessToken, StoreError> {
        let token_uri = self
            .token_uri_override
            .as_deref()
            .unwrap_or(key.token_uri.as_str());
        let now = Utc::now();
        let assertion = build_assertion(key, token_uri, now)?;

        debug!("Requesting access token from {}", token_uri);
        let response = self
            .http
            .post(token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => format!("HTTP {}: {}", status.as_u16(), body.trim()),
            };
            return Err(StoreError::Auth(message));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::Auth(format!("unexpected token response: {}", e)))?;

        Ok(AccessToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_with(private_key: &str) -> ServiceAccountKey {
        serde_json::from_value(serde_json::json!({
            "private_key": private_key,
            "client_email": "uploader@pricing-338819.iam.gserviceaccount.com",
        }))
        .unwrap()
    }

    #[test]
    fn test_invalid_private_key_is_auth_error() {
        let key = key_with("not a pem key");
        let err = build_assertion(&key, &key.token_uri, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Auth(msg) if msg.contains("invalid private key")));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken {
            token: "ya29.secret".to_string(),
            expires_at: Utc::now(),
        };
        assert!(!format!("{:?}", token).contains("ya29"));
    }
}
