use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::auth::AuthTokenProvider;
use crate::errors::ServiceError;
use crate::models::DocumentType;

/// Known duplicate-constraint fragments in gateway error messages. The
/// external system reports duplicates as message text, not a structured
/// code; revisit once an error-code contract exists.
static DUPLICATE_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(đã tồn tại|da ton tai|duplicate|already exists|trùng chứng từ)")
        .expect("duplicate signature pattern")
});

/// True when a gateway message matches a known duplicate-constraint
/// signature.
pub fn message_signals_duplicate(message: &str) -> bool {
    DUPLICATE_SIGNATURE.is_match(message)
}

/// Response envelope of the accounting gateway. `status == 1` is the only
/// success signal; any other value, including an absent field, is failure.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: i64,
    pub message: String,
    pub correlation_id: Option<String>,
    pub raw: Value,
}

impl GatewayResponse {
    pub fn from_raw(raw: Value) -> Self {
        let status = raw.get("status").and_then(Value::as_i64).unwrap_or(0);
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let correlation_id = raw
            .get("guid")
            .and_then(Value::as_str)
            .map(str::to_string);
        GatewayResponse {
            status,
            message,
            correlation_id,
            raw,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 1
    }

    /// The document already exists upstream; the step that produced it is
    /// treated as settled.
    pub fn is_duplicate(&self) -> bool {
        !self.is_success() && message_signals_duplicate(&self.message)
    }
}

/// Submission gateway of the external accounting system.
#[async_trait]
pub trait AccountingGateway: Send + Sync {
    async fn submit(
        &self,
        document_type: DocumentType,
        payload: Value,
    ) -> Result<GatewayResponse, ServiceError>;
}

/// HTTP implementation. Owns the shared token provider; on an authorization
/// rejection it re-authenticates once and retries the single failing call,
/// then gives up.
pub struct HttpAccountingGateway {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthTokenProvider>,
}

impl HttpAccountingGateway {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, auth: Arc<AuthTokenProvider>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            auth,
        }
    }

    async fn submit_once(
        &self,
        document_type: DocumentType,
        payload: &Value,
    ) -> Result<reqwest::Response, ServiceError> {
        let token = self.auth.token().await?;
        let url = format!("{}/{}", self.base_url, document_type.endpoint_path());
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl AccountingGateway for HttpAccountingGateway {
    async fn submit(
        &self,
        document_type: DocumentType,
        payload: Value,
    ) -> Result<GatewayResponse, ServiceError> {
        let mut response = self.submit_once(document_type, &payload).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(%document_type, "gateway rejected token, re-authenticating once");
            self.auth.invalidate().await;
            response = self.submit_once(document_type, &payload).await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(ServiceError::ExternalAuthError(format!(
                    "{document_type} submission rejected twice after re-authentication"
                )));
            }
        }

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "{document_type} submission failed with status {}",
                response.status()
            )));
        }

        let raw: Value = response.json().await?;
        let parsed = GatewayResponse::from_raw(raw);
        debug!(
            %document_type,
            status = parsed.status,
            correlation_id = parsed.correlation_id.as_deref().unwrap_or(""),
            "gateway response"
        );
        Ok(parsed)
    }
}
