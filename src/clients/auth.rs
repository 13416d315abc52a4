use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::ServiceError;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    expires_in: i64,
}

/// Shared bearer credential for the accounting gateway.
///
/// The token is a single time-boxed value shared by every concurrent order.
/// Refresh is single-flight: the cache mutex is held across the login call,
/// so concurrent callers waiting on an expired token all receive the result
/// of the one refresh instead of issuing their own.
pub struct AuthTokenProvider {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    ttl_margin: Duration,
    cache: Mutex<Option<CachedToken>>,
}

impl AuthTokenProvider {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        ttl_margin_secs: i64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            ttl_margin: Duration::seconds(ttl_margin_secs),
            cache: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, logging in if the cached one expired.
    pub async fn token(&self) -> Result<String, ServiceError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Utc::now() {
                return Ok(cached.token.clone());
            }
            debug!("cached accounting token expired, refreshing");
        }
        let fresh = self.login().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    /// Drops the cached token so the next caller performs a fresh login.
    /// Called after the gateway sees an authorization rejection.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        *cache = None;
    }

    async fn login(&self) -> Result<CachedToken, ServiceError> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                username: &self.username,
                password: &self.password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalAuthError(format!(
                "accounting login failed with status {}",
                response.status()
            )));
        }

        let body: LoginResponse = response.json().await?;
        info!("accounting token refreshed");
        Ok(CachedToken {
            token: body.token,
            expires_at: Utc::now() + Duration::seconds(body.expires_in) - self.ttl_margin,
        })
    }
}
