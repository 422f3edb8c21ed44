//! Reqwest-based HTTP client for the Conductor server API.

use std::sync::Arc;

use conductor_workflow::executor::ExecutorService;
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

use super::ConductorConfig;
use crate::error::{Error, Result};

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "conductor_reqwest::client";

/// Header carrying the access token.
const AUTHORIZATION_HEADER: &str = "X-Authorization";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    key_id: &'a str,
    key_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Inner client that holds the HTTP client, configuration and token cache.
struct ConductorClientInner {
    http: Client,
    config: ConductorConfig,
    base_url: Url,
    token: RwLock<Option<String>>,
}

/// Reqwest-based client for a Conductor server.
///
/// This client implements the `WorkflowExecutor` trait. It is cheap to clone
/// and safe to share between tasks.
///
/// # Examples
///
/// ```rust,ignore
/// use conductor_reqwest::{ConductorClient, ConductorConfig};
///
/// let client = ConductorClient::new(ConductorConfig::default())?;
/// let executor = client.into_service();
/// ```
#[derive(Clone)]
pub struct ConductorClient {
    inner: Arc<ConductorClientInner>,
}

impl std::fmt::Debug for ConductorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConductorClient")
            .field("config", &self.inner.config)
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ConductorClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ConductorConfig) -> conductor_workflow::Result<Self> {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();
        let base_url = base_url(&config.server_url)?;

        tracing::debug!(
            target: TRACING_TARGET,
            server_url = %base_url,
            timeout_ms = timeout.as_millis(),
            authenticated = config.credentials().is_some(),
            "Creating conductor client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .map_err(Error::from)?;

        let inner = ConductorClientInner {
            http,
            config,
            base_url,
            token: RwLock::new(None),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the underlying HTTP client.
    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ConductorConfig {
        &self.inner.config
    }

    /// Converts this client into an [`ExecutorService`] for use with dependency injection.
    pub fn into_service(self) -> ExecutorService {
        ExecutorService::new(self)
    }

    /// Resolves an endpoint path relative to the server API root.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Resolves an endpoint and appends `segments`, percent-encoding each one.
    pub(crate) fn endpoint_with_segments(&self, path: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeABase(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request with the access token attached.
    ///
    /// A `401` answer drops the cached token and retries once with a fresh one.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let retry = request.try_clone();
        let response = self.authorize(request).await?.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && self.config().credentials().is_some()
            && let Some(retry) = retry
        {
            tracing::debug!(
                target: TRACING_TARGET,
                "Access token rejected, refreshing"
            );

            self.invalidate_token().await;
            let response = self.authorize(retry).await?.send().await?;
            return check_status(response).await;
        }

        check_status(response).await
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.access_token().await? {
            Some(token) => request.header(AUTHORIZATION_HEADER, token),
            None => request,
        })
    }

    /// Returns the cached access token, requesting one if needed.
    ///
    /// Returns `None` when no credentials are configured.
    pub(crate) async fn access_token(&self) -> Result<Option<HeaderValue>> {
        let Some((key_id, key_secret)) = self.config().credentials() else {
            return Ok(None);
        };

        if let Some(token) = self.inner.token.read().await.as_deref() {
            return header_value(token).map(Some);
        }

        let mut cached = self.inner.token.write().await;
        if let Some(token) = cached.as_deref() {
            return header_value(token).map(Some);
        }

        tracing::debug!(
            target: TRACING_TARGET,
            key_id = %key_id,
            "Requesting access token"
        );

        let request = self
            .http()
            .post(self.endpoint("token")?)
            .json(&TokenRequest { key_id, key_secret });
        let response = check_status(request.send().await?).await?;
        let TokenResponse { token } = decode(response).await?;

        // Only tokens usable as a header value are cached.
        let header = header_value(&token)?;
        *cached = Some(token);
        Ok(Some(header))
    }

    pub(crate) async fn invalidate_token(&self) {
        self.inner.token.write().await.take();
    }
}

/// Parses the server URL and makes sure endpoints join below its path.
fn base_url(server_url: &str) -> Result<Url> {
    let mut url = Url::parse(server_url)?;
    if url.cannot_be_a_base() {
        return Err(Error::CannotBeABase(server_url.to_owned()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn header_value(token: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(token).map_err(Error::InvalidToken)
}

/// Reads the whole response body and deserializes it as JSON.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Turns a non-success response into [`Error::Status`].
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::Status { status, body })
}
