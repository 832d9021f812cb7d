//! HTTP client the web tier uses to reach the internal API.

use std::time::Duration;

use http::{Method, StatusCode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::auth::TokenPair;

const AUTH_TIMEOUT: Duration = Duration::from_secs(10);
const DATA_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ProxyError {
    /// The API answered with a non-success status.
    #[error("Internal API returned {status}: {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: StatusCode,
        message: Option<String>,
        error: Option<String>,
    },
    #[error("Internal API unreachable: {0}")]
    Network(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Api { status, .. } => *status,
            ProxyError::Network(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The API's own message when it sent one.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ProxyError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Machine readable code such as `UNAUTHORIZED`, when the API sent one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ProxyError::Api { error, .. } => error.as_deref(),
            ProxyError::Network(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiLoginRequest<'a> {
    pub email: &'a str,
    pub password: Option<&'a str>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub device_category: &'static str,
    pub device_type: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiLoginResponse {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub data: AdminProfile,
}

#[derive(Debug, Deserialize)]
struct ValidateTokensResponse {
    status: bool,
    access_token: Option<String>,
    refresh_token: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
pub struct InternalApiClient {
    client: Client,
    base_url: String,
}

impl InternalApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        label: &str,
    ) -> Result<reqwest::Response, ProxyError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Internal API {} failed: {}", label, e);
            ProxyError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().await.ok();
        let err = ProxyError::Api {
            status,
            message: body.as_ref().and_then(|b| b.message.clone()),
            error: body.and_then(|b| b.error),
        };
        tracing::warn!("Internal API {}: {}", label, err);
        Err(err)
    }

    /// Call an API route with the session's bearer token and return the
    /// decoded JSON body.
    pub async fn call_with_token(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        access_token: &str,
    ) -> Result<Value, ProxyError> {
        let url = self.url(path);
        tracing::info!("Calling internal API {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .timeout(DATA_TIMEOUT)
            .query(query);
        if !access_token.is_empty() {
            request = request.bearer_auth(access_token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.send(request, path).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ProxyError::Network(e.to_string()))
    }

    pub async fn login(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> Result<ApiLoginResponse, ProxyError> {
        let body = ApiLoginRequest {
            email,
            password,
            kind: "Admin",
            device_category: "Web",
            device_type: "WEB",
        };
        let request = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .timeout(AUTH_TIMEOUT)
            .json(&body);

        let response = self.send(request, "login").await?;
        response
            .json::<ApiLoginResponse>()
            .await
            .map_err(|e| ProxyError::Network(e.to_string()))
    }

    /// Exchange the session's tokens for a fresh pair.
    pub async fn validate_tokens(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<TokenPair, ProxyError> {
        let request = self
            .client
            .post(self.url("/api/v1/auth/validate-tokens"))
            .timeout(AUTH_TIMEOUT)
            .json(&serde_json::json!({
                "access_token": access_token,
                "refresh_token": refresh_token,
            }));

        let response = self.send(request, "validate-tokens").await?;
        let body = response
            .json::<ValidateTokensResponse>()
            .await
            .map_err(|e| ProxyError::Network(e.to_string()))?;

        match (body.status, body.access_token, body.refresh_token) {
            (true, Some(access_token), Some(refresh_token)) => Ok(TokenPair {
                access_token,
                refresh_token,
            }),
            _ => Err(ProxyError::Api {
                status: StatusCode::UNAUTHORIZED,
                message: body.message,
                error: None,
            }),
        }
    }
}
