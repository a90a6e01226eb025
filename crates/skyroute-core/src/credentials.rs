//! OAuth client-credentials token lifecycle.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::{saturating_add, Clock};
use crate::config::OAuthCredentials;
use crate::error::UpstreamError;
use crate::http_client::{HttpClient, HttpRequest};

/// Seconds shaved off the server-reported lifetime so renewal happens before expiry.
const RENEWAL_MARGIN_SECS: i64 = 30;
/// Floor on the computed lifetime, so a tiny `expires_in` cannot cause a renewal storm.
const MIN_LIFETIME_SECS: i64 = 1;
/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 300;
/// Ceiling on the server-reported lifetime (one week).
const MAX_EXPIRES_IN_SECS: i64 = 7 * 24 * 60 * 60;

/// Bearer token with its local expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Builds a token issued at `issued_at` with lifetime `max(expires_in - 30, 1)` seconds.
    pub fn issued(value: impl Into<String>, issued_at: OffsetDateTime, expires_in: i64) -> Self {
        let lifetime = expires_in
            .saturating_sub(RENEWAL_MARGIN_SECS)
            .max(MIN_LIFETIME_SECS);
        Self {
            value: value.into(),
            expires_at: saturating_add(issued_at, Duration::seconds(lifetime)),
        }
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        now <= self.expires_at
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Owns the single shared token slot.
///
/// Concurrent callers serialise on the slot, so at most one renewal is in flight and
/// later callers reuse its result.
pub struct CredentialProvider {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    oauth: Option<OAuthCredentials>,
    token_urls: Vec<String>,
    timeout_ms: u64,
    slot: Mutex<Option<Token>>,
}

impl CredentialProvider {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        oauth: Option<OAuthCredentials>,
        token_urls: Vec<String>,
    ) -> Self {
        Self {
            http_client,
            clock,
            oauth,
            token_urls,
            timeout_ms: 10_000,
            slot: Mutex::new(None),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.oauth.is_some()
    }

    /// Returns a valid bearer token, renewing it when needed.
    ///
    /// `Ok(None)` means no client credentials are configured and the caller should fall
    /// back to basic auth or an unauthenticated call.
    pub async fn token(&self) -> Result<Option<Token>, UpstreamError> {
        let Some(oauth) = &self.oauth else {
            debug!("no OAuth client credentials configured; skipping token request");
            return Ok(None);
        };

        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.is_valid_at(self.clock.now()) {
                return Ok(Some(token.clone()));
            }
        }

        let token = self.renew(oauth).await?;
        *slot = Some(token.clone());
        Ok(Some(token))
    }

    /// Drops the cached token so the next call renews it.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }

    async fn renew(&self, oauth: &OAuthCredentials) -> Result<Token, UpstreamError> {
        let mut failures = Vec::new();

        for url in &self.token_urls {
            info!(token_url = %url, "requesting OAuth token");
            match self.request_token(url, oauth).await {
                Ok(token) => {
                    info!(expires_at = %token.expires_at, "obtained OAuth token");
                    return Ok(token);
                }
                Err(error) => {
                    warn!(token_url = %url, %error, "token request failed");
                    failures.push(error);
                }
            }
        }

        if failures.len() > 1 {
            warn!(attempts = failures.len(), "all token endpoints failed");
        }
        Err(failures
            .pop()
            .unwrap_or_else(|| UpstreamError::unavailable("no token endpoints configured")))
    }

    async fn request_token(
        &self,
        url: &str,
        oauth: &OAuthCredentials,
    ) -> Result<Token, UpstreamError> {
        let mut fields = vec![
            ("grant_type", "client_credentials"),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
        ];
        if let Some(scope) = &oauth.scope {
            fields.push(("scope", scope.as_str()));
        }

        let issued_at = self.clock.now();
        let request = HttpRequest::post(url)
            .with_form(fields)
            .with_timeout_ms(self.timeout_ms);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| UpstreamError::transport("token endpoint", &error))?;

        if !response.is_success() {
            return Err(UpstreamError::from_status(
                response.status,
                format!("token endpoint returned {}: {}", response.status, response.body),
            ));
        }

        let payload: Value = serde_json::from_str(&response.body).map_err(|error| {
            UpstreamError::unavailable(format!("token response is not JSON: {error}"))
        })?;

        let access_token = payload
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| UpstreamError::unavailable("token response missing access_token"))?;

        Ok(Token::issued(
            access_token,
            issued_at,
            expires_in(payload.get("expires_in")),
        ))
    }
}

fn expires_in(value: Option<&Value>) -> i64 {
    let parsed = match value {
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|secs| secs as i64)),
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .filter(|secs| *secs != 0)
        .map_or(DEFAULT_EXPIRES_IN_SECS, |secs| secs.min(MAX_EXPIRES_IN_SECS))
}
