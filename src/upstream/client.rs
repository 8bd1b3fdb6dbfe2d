//! REST client for the upstream attendance service.
//!
//! Wraps the upstream HTTP API using [`reqwest`]. Every request carries
//! the current bearer token from the shared [`TokenStore`]; non-2xx
//! answers are turned into [`GatewayError::UpstreamStatus`] carrying the
//! upstream's `message` field when it sends one.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::TokenStore;
use crate::error::GatewayError;

/// HTTP client for one upstream attendance service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    token: TokenStore,
}

impl UpstreamClient {
    /// Creates a client for `base_url` (e.g. `http://host:8080/api`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] if the underlying HTTP client
    /// cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        token: TokenStore,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url, token))
    }

    /// Creates a client reusing an existing [`reqwest::Client`].
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, token: TokenStore) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// The shared token store.
    #[must_use]
    pub const fn token(&self) -> &TokenStore {
        &self.token
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `GET {base}{path}?{query}` and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] on transport or decode failure
    /// and [`GatewayError::UpstreamStatus`] on a non-2xx answer.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let request = self.http.get(self.url(path)).query(query);
        let response = self.authorize(request).await.send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Sends `POST {base}{path}` with an optional JSON body and returns the
    /// JSON answer (`null` for an empty body, a string for non-JSON text).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] on transport failure and
    /// [`GatewayError::UpstreamStatus`] on a non-2xx answer.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<serde_json::Value, GatewayError> {
        let mut request = self.http.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.authorize(request).await.send().await?;
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }))
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.get().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Returns the response unchanged on success, or an
    /// [`GatewayError::UpstreamStatus`] with the upstream message.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::UpstreamStatus {
            status: status.as_u16(),
            message: upstream_message(&body).unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("error").to_string()
                } else {
                    body
                }
            }),
        })
    }
}

/// Extracts the `message` field of a JSON error body.
fn upstream_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_field() {
        assert_eq!(
            upstream_message(r#"{"message":"Event not found","status":404}"#).as_deref(),
            Some("Event not found")
        );
        assert!(upstream_message("<html>oops</html>").is_none());
        assert!(upstream_message(r#"{"error":"x"}"#).is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = UpstreamClient::with_client(
            reqwest::Client::new(),
            "http://localhost:8080/api/",
            TokenStore::default(),
        );
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/attendance"), "http://localhost:8080/api/attendance");
    }
}
