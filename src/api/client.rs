//! HTTP client for the fomo REST API.
//!
//! One [`ApiClient`] is built at startup from the stored API key and passed
//! to whoever needs it. Typed endpoints live in sibling modules as further
//! `impl ApiClient` blocks.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::{classify_reqwest_error, AuthError, FomoResult, NetworkError};

/// Message used when an error body carries nothing better.
const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

pub struct ApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3002`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Create a client from stored credentials.
    ///
    /// Fails with [`AuthError::NotAuthenticated`] when no API key is stored.
    pub fn from_credentials(
        base_url: impl Into<String>,
        credentials: &Credentials,
    ) -> Result<Self, AuthError> {
        match &credentials.api_key {
            Some(key) if credentials.has_api_key() => Ok(Self::new(base_url, key.clone())),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path such as `/approvals`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> FomoResult<T> {
        self.request::<T, ()>(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FomoResult<T> {
        self.request::<T, ()>(Method::GET, path, query, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> FomoResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, &[], body).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> FomoResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> FomoResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> FomoResult<T> {
        self.request::<T, ()>(Method::DELETE, path, &[], None).await
    }

    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> FomoResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(&self.api_key);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e, &url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = parse_error_body(status.as_u16(), &body);
            debug!("{} failed: {}", url, err);
            return Err(err.into());
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(serde_json::from_value(Value::Null)?);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e, &url))?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(serde_json::from_value(unwrap_envelope(value))?)
    }
}

/// Build an API error from a non-2xx body.
///
/// Understands `{error: {code, message}}` as well as flat
/// `{message | error, code}` bodies.
pub fn parse_error_body(status: u16, body: &str) -> NetworkError {
    let mut message = DEFAULT_ERROR_MESSAGE.to_string();
    let mut code = None;

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        let non_empty = |v: Option<&Value>| {
            v.and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match obj.get("error") {
            Some(Value::Object(err)) => {
                if let Some(m) = non_empty(err.get("message")) {
                    message = m;
                }
                code = non_empty(err.get("code"));
            }
            error => {
                if let Some(m) = non_empty(obj.get("message")).or_else(|| non_empty(error)) {
                    message = m;
                }
                code = non_empty(obj.get("code"));
            }
        }
    }

    NetworkError::Api {
        status,
        message,
        code,
    }
}

/// Strip the `{success, data}` envelope, if present.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("success") && obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Percent-encode one path segment.
pub(crate) fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
