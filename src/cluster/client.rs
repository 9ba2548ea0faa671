//! Cluster REST client implementation.
//!
//! This module provides the HTTP client every resource handler shares for
//! one invocation of the tool.
//!
//! Paths are passed as segments. Each segment is percent-encoded on its own,
//! so a resource name can never add path levels, a query or a fragment.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use crate::config::{AuthConfig, ClusterConfig};
use crate::error::{ClusterError, EstateError, Result};
use crate::resources::JsonObject;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Cluster REST client.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    /// HTTP client.
    client: Client,
    /// Base URL of the REST API.
    base_url: Url,
    /// Authentication scheme applied to every request.
    auth: AuthConfig,
}

impl ClusterClient {
    /// Creates a client for the given cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed, the CA certificate
    /// cannot be read or the HTTP client cannot be created.
    pub fn new(config: &ClusterConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed, the CA certificate
    /// cannot be read or the HTTP client cannot be created.
    pub fn with_timeout(config: &ClusterConfig, timeout_secs: u64) -> Result<Self> {
        let base_url = Url::parse(&config.url).map_err(|e| ClusterError::ClientSetup {
            message: format!("Invalid cluster URL '{}': {e}", config.url),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClusterError::ClientSetup {
                message: format!("Cluster URL '{}' cannot carry a path", config.url),
            }
            .into());
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(!config.tls.verify);

        if let Some(ca_cert) = &config.tls.ca_cert {
            let pem = std::fs::read(ca_cert).map_err(|e| ClusterError::ClientSetup {
                message: format!("Cannot read CA certificate {}: {e}", ca_cert.display()),
            })?;
            let certificate =
                reqwest::Certificate::from_pem(&pem).map_err(|e| ClusterError::ClientSetup {
                    message: format!("Invalid CA certificate {}: {e}", ca_cert.display()),
                })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder.build().map_err(|e| ClusterError::ClientSetup {
            message: format!("Failed to create HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            base_url,
            auth: config.auth.clone(),
        })
    }

    /// Returns the base URL of the cluster.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Fetches the cluster banner (`GET /`).
    ///
    /// # Errors
    ///
    /// Returns a connection error if the cluster cannot be reached.
    pub async fn info(&self) -> Result<Value> {
        let response = self.send(Method::GET, &[], &[], None).await?;
        let response = Self::check(response).await?;
        Self::parse(response).await
    }

    /// Issues a `GET` and parses the JSON body.
    ///
    /// Returns `None` on 404 so callers can treat "not found" as absent.
    ///
    /// # Errors
    ///
    /// Returns an error on any other non-success status or transport failure.
    pub async fn get_json(&self, path: &[&str]) -> Result<Option<Value>> {
        self.get_json_with_query(path, &[]).await
    }

    /// Issues a `GET` with query parameters and parses the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_json`].
    pub async fn get_json_with_query(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Option<Value>> {
        let response = self.send(Method::GET, path, query, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("GET /{}: not found", path.join("/"));
            return Ok(None);
        }
        let response = Self::check(response).await?;
        Self::parse(response).await.map(Some)
    }

    /// Issues a `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on non-success status or transport failure.
    pub async fn put_json(&self, path: &[&str], body: &JsonObject) -> Result<()> {
        let response = self.send(Method::PUT, path, &[], Some(body)).await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Issues a `DELETE`.
    ///
    /// # Errors
    ///
    /// Returns an error on non-success status (including 404) or transport
    /// failure.
    pub async fn delete(&self, path: &[&str]) -> Result<()> {
        let response = self.send(Method::DELETE, path, &[], None).await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Issues a `HEAD` and reports whether the target exists.
    ///
    /// # Errors
    ///
    /// Returns an error on statuses other than 2xx/404 or transport failure.
    pub async fn exists(&self, path: &[&str]) -> Result<bool> {
        let response = self.send(Method::HEAD, path, &[], None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }

    /// Builds the full URL for an API path, encoding every segment.
    fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if !path.is_empty() {
            // cannot_be_a_base URLs are rejected at construction
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().extend(path);
            }
        }
        url
    }

    /// Applies the configured authentication to a request.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            AuthConfig::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            AuthConfig::ApiKey { api_key } => {
                request.header(reqwest::header::AUTHORIZATION, format!("ApiKey {api_key}"))
            }
            AuthConfig::Bearer { token } => request.bearer_auth(token),
        }
    }

    /// Sends a single request.
    async fn send(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, &str)],
        body: Option<&JsonObject>,
    ) -> Result<Response> {
        let url = self.url(path);
        trace!("{method} {url}");

        let mut request = self.authorize(self.client.request(method, url.clone()));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| {
            EstateError::from(ClusterError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Maps non-success statuses to errors.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ClusterError::AuthenticationFailed {
                message: format!("{status}: {body}"),
            }
            .into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClusterError::request_failed(status.as_u16(), body).into());
        }

        Ok(response)
    }

    /// Parses a JSON response body.
    async fn parse(response: Response) -> Result<Value> {
        response.json::<Value>().await.map_err(|e| {
            EstateError::from(ClusterError::invalid_response(format!(
                "Failed to parse response: {e}"
            )))
        })
    }
}
