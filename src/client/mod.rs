//! HTTP client for the EcoleDirecte API.
//!
//! Every vendor call goes through [`ApiClient::request`]. The vendor answers `200 OK`
//! even when a call fails; the outcome lives in the JSON envelope:
//!
//! ```text
//! {"code": 200, "token": "...", "message": "", "data": {...}}
//! {"code": 505, "token": "", "message": "Identifiant et/ou mot de passe invalide !", "data": {}}
//! ```
//!
//! The token is rotated on every successful call and must be sent on the next one.

mod config;
pub mod events;

use std::fmt;
use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

pub use config::{ClientConfig, DEFAULT_ROOT};
use events::{ApiEvent, EventHub, RequestEvent, ResponseEvent};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";

/// Headers the web app sends. Applied first, then [`ClientConfig::added_headers`].
pub const VENDOR_HEADERS: [(&str, &str); 10] = [
    ("authority", "api.ecoledirecte.com"),
    ("accept", "application/json, text/plain, */*"),
    ("user-agent", USER_AGENT),
    ("content-type", "application/x-www-form-urlencoded"),
    ("origin", "https://www.ecoledirecte.com"),
    ("sec-fetch-site", "same-site"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-dest", "empty"),
    ("referer", "https://www.ecoledirecte.com/"),
    ("accept-language", "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7"),
];

/// Carries the token both ways: sent on requests, read back from responses.
const TOKEN_HEADER: &str = "x-token";

const SUCCESS_CODE: i64 = 200;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Api(#[from] ApiFailure),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Account error: {0}")]
    Account(String),
}

/// Failure envelope reported by the API inside an HTTP 200 response.
#[derive(Debug, Clone, Error)]
#[error("API error {code}: {message}")]
pub struct ApiFailure {
    pub code: i64,
    pub message: String,
    /// The whole response body, for callers that need the vendor's `data` details.
    pub body: Value,
}

impl ApiFailure {
    fn from_body(body: &Value) -> Self {
        Self {
            code: envelope_code(body).unwrap_or_default(),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            body: body.clone(),
        }
    }
}

/// The rotating session token, shared by a session and every account handle made from it.
///
/// Reads happen when a request is built, writes after each successful response.
/// Concurrent calls race and the last response to settle wins.
#[derive(Clone, Default)]
pub struct SessionToken(Arc<RwLock<String>>);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(token.into())))
    }

    pub fn get(&self) -> String {
        match self.0.read() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        match self.0.write() {
            Ok(mut current) => *current = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// One call to the API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path appended to [`ClientConfig::root`], query string included.
    pub path: String,
    /// Sent form-encoded as `data=<json>` on POST. Ignored on GET.
    pub body: Option<Value>,
    /// Turn a failure envelope into [`ClientError::Api`].
    pub guard: bool,
    /// Forwarded to [`RequestEvent::context`] for listeners.
    pub context: Value,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            guard: false,
            context: Value::Null,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
            guard: false,
            context: Value::Null,
        }
    }

    pub fn guarded(mut self) -> Self {
        self.guard = true;
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}

/// HTTP client for the EcoleDirecte API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    client: Client,
    events: EventHub,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: Client::new(),
            events: EventHub::new(),
        }
    }

    /// Create client from environment variables.
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Receive a [`ApiEvent`] before and after every call made through this client
    /// (or any of its clones).
    pub fn subscribe(&self) -> broadcast::Receiver<ApiEvent> {
        self.events.subscribe()
    }

    /// Vendor headers overlaid with the configured ones.
    fn headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        let configured = self
            .config
            .added_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()));
        for (name, value) in VENDOR_HEADERS.into_iter().chain(configured) {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeader(name.to_string()))?;
            headers.insert(name, header_value(value)?);
        }
        Ok(headers)
    }

    /// Perform one round trip and return the parsed body.
    ///
    /// When `token` is given, its current value is sent and, unless the body is a
    /// failure envelope, the rotated token (body `token`, else the `x-token` header)
    /// is written back to it.
    pub async fn request(
        &self,
        req: ApiRequest,
        token: Option<&SessionToken>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.config.root, req.path);
        let mut headers = self.headers()?;
        if let Some(current) = token.map(SessionToken::get).filter(|t| !t.is_empty()) {
            headers.insert(HeaderName::from_static(TOKEN_HEADER), header_value(&current)?);
        }
        let body = if req.method == Method::POST {
            Some(form_body(req.body.as_ref())?)
        } else {
            None
        };

        let id = self.events.next_id();
        self.events.emit(ApiEvent::Request(RequestEvent {
            id,
            method: req.method.to_string(),
            url: url.clone(),
            body: events::redact(req.body.as_ref()),
            context: req.context.clone(),
        }));
        tracing::debug!(id, method = %req.method, url = %url, "Sending API request");

        let mut builder = self.client.request(req.method.clone(), &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let response_headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        let failure = is_failure(&body);
        tracing::debug!(id, status = status.as_u16(), failure, "Received API response");

        let header_token = response_headers
            .iter()
            .find(|(name, _)| name == TOKEN_HEADER)
            .map(|(_, value)| value.clone());
        self.events.emit(ApiEvent::Response(ResponseEvent {
            id,
            status: status.as_u16(),
            headers: response_headers,
            body: body.clone(),
            failure,
        }));

        if failure {
            let failure = ApiFailure::from_body(&body);
            tracing::warn!(id, code = failure.code, "API reported failure: {}", failure.message);
            if req.guard {
                return Err(failure.into());
            }
        } else if let Some(token) = token {
            if let Some(rotated) = rotated_token(&body, header_token.as_deref()) {
                token.set(rotated);
            }
        }

        Ok(body)
    }

    /// Like [`request`](Self::request), then decode the envelope's `data` field.
    pub async fn request_data<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
        token: Option<&SessionToken>,
    ) -> Result<T, ClientError> {
        let mut body = self.request(req, token).await?;
        let data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    /// Download binary content such as profile photos.
    ///
    /// Returns `None` when the server does not answer with a success status.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Option<Vec<u8>>, ClientError> {
        let url = self.config.absolute_url(url);
        tracing::debug!(url = %url, "Downloading content");

        let response = self.client.get(&url).headers(self.headers()?).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Content download failed");
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(value.to_string()))
}

/// `data=<json>`, the only form field the API reads.
fn form_body(body: Option<&Value>) -> Result<String, ClientError> {
    let json = match body {
        Some(body) => serde_json::to_string(body)?,
        None => "{}".to_string(),
    };
    Ok(format!("data={}", urlencoding::encode(&json)))
}

/// Envelope `code`, which the API sends either as a number or a numeric string.
fn envelope_code(body: &Value) -> Option<i64> {
    match body.get("code")? {
        Value::Number(code) => code.as_i64(),
        Value::String(code) => code.trim().parse().ok(),
        _ => None,
    }
}

/// True unless the body carries the success code.
pub fn is_failure(body: &Value) -> bool {
    envelope_code(body) != Some(SUCCESS_CODE)
}

fn rotated_token(body: &Value, header: Option<&str>) -> Option<String> {
    body.get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .or(header.filter(|token| !token.is_empty()))
        .map(str::to_string)
}
