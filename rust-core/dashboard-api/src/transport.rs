// SPDX-License-Identifier: PMPL-1.0-or-later
//! HTTP transport shared by all dashboard API clients.
//!
//! [`HttpTransport`] owns the base URL, the pooled `reqwest` client, the
//! credentials and the timeout. The version-specific clients only build
//! paths and bodies and delegate the round trip here.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::config::{Auth, DashboardApiConfig};
use crate::error::{DashboardApiError, Result};
use crate::k8s::validate_namespace;

/// Error body shape shared by the REST and resource APIs (`{"message": ...}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpTransport {
    /// Always ends with `/` so relative paths keep any sub-path.
    base_url: Url,
    http: reqwest::Client,
    auth: Auth,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from the connection part of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardApiError::Validation`] if the base URL cannot be
    /// parsed or the namespace is not a single path segment, or
    /// [`DashboardApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &DashboardApiConfig) -> Result<Self> {
        validate_namespace(&config.namespace)?;
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| DashboardApiError::Validation(format!("Invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardApiError::Validation(format!(
                "Invalid base URL: {} cannot be a base",
                config.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DashboardApiError::Network)?;

        Ok(Self {
            base_url,
            http,
            auth: config.auth.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Join `path` (relative, leading `/` tolerated) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DashboardApiError::Validation(format!("Invalid request path {path}: {e}")))
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
        }
    }

    /// GET `path` with query pairs and decode the JSON body.
    #[instrument(skip(self, query), level = "debug")]
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let url = self.url(path)?;
        let request = self.apply_auth(self.http.get(url)).query(query);
        self.send(request).await
    }

    #[instrument(skip(self, body), level = "debug")]
    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path)?;
        let request = self.apply_auth(self.http.post(url)).json(body);
        self.send(request).await
    }

    #[instrument(skip(self, body), level = "debug")]
    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path)?;
        let request = self.apply_auth(self.http.put(url)).json(body);
        self.send(request).await
    }

    /// DELETE `path` and decode whatever the server answers with.
    #[instrument(skip(self), level = "debug")]
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let request = self.apply_auth(self.http.delete(url));
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!(status = status.as_u16(), "Dashboard API response");

        if status.is_success() {
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            // Some deletes answer with an empty body.
            let body = if body.trim().is_empty() { "null" } else { body.as_str() };
            serde_json::from_str(body).map_err(DashboardApiError::Serialization)
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> DashboardApiError {
        if error.is_timeout() {
            DashboardApiError::Timeout(self.timeout.as_millis() as u64)
        } else {
            DashboardApiError::Network(error)
        }
    }

    /// Turn a non-2xx response into the matching error variant.
    async fn extract_error(response: reqwest::Response) -> DashboardApiError {
        let status = response.status().as_u16();

        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody { message: Some(message) }) if !message.is_empty() => message,
            _ => format!("HTTP {status}"),
        };

        match status {
            404 => DashboardApiError::NotFound(message),
            401 | 403 => DashboardApiError::Unauthorized(message),
            409 | 412 => DashboardApiError::Conflict(message),
            _ => DashboardApiError::Server { status, message },
        }
    }
}
