//! CKAN client for the `action` and `rest` endpoints of an open data portal.
//!
//! Only the read-only calls the downloader needs are implemented:
//! `api/action/{package,group,tag}_list`, `api/rest/{dataset,group,tag}/{name}`
//! and plain GETs of resource URLs.

use std::time::Duration;

use odufrn_core::HttpConfig;
use odufrn_core::error::AppError;
use odufrn_core::traits::PortalApi;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Generic wrapper for CKAN action API responses.
///
/// CKAN API reference: <https://docs.ckan.org/en/2.9/api/>
///
/// ```json
/// {
///     "success": bool,
///     "result": T
/// }
/// ```
///
/// Older portals omit `success`; it is then assumed to be `true`.
#[derive(Deserialize, Debug)]
struct CkanResponse<T> {
    #[serde(default = "default_success")]
    success: bool,
    result: T,
}

fn default_success() -> bool {
    true
}

/// HTTP client for CKAN open data portals.
///
/// # Examples
///
/// ```no_run
/// use odufrn_client::CkanClient;
/// use odufrn_core::traits::PortalApi;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CkanClient::new("http://dados.ufrn.br")?;
/// let packages = client.fetch_list("package_list").await?;
/// println!("Found {} packages", packages.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CkanClient {
    client: Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl CkanClient {
    /// Creates a client for the portal with the default [`HttpConfig`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidPortalUrl` if the URL is invalid or malformed.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(base_url_str: &str) -> Result<Self, AppError> {
        Self::with_config(base_url_str, &HttpConfig::default())
    }

    /// Creates a client with a custom user agent and timeout.
    pub fn with_config(base_url_str: &str, http_config: &HttpConfig) -> Result<Self, AppError> {
        let base_url = parse_base_url(base_url_str)?;

        let mut builder = Client::builder().user_agent(http_config.user_agent.as_str());
        if let Some(timeout) = http_config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout: http_config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InvalidPortalUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response, AppError> {
        tracing::debug!(url = %url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))
    }

    async fn read_json<T: DeserializeOwned>(&self, resp: Response) -> Result<T, AppError> {
        let body = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn classify(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout.map(|t| t.as_secs()).unwrap_or_default())
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {}", e))
        } else {
            AppError::ClientError(e.to_string())
        }
    }
}

fn parse_base_url(base_url_str: &str) -> Result<Url, AppError> {
    let mut base_url = Url::parse(base_url_str)
        .map_err(|_| AppError::InvalidPortalUrl(base_url_str.to_string()))?;
    if base_url.cannot_be_a_base() {
        return Err(AppError::InvalidPortalUrl(base_url_str.to_string()));
    }
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    Ok(base_url)
}

fn status_error(status: StatusCode, url: &Url) -> AppError {
    AppError::ClientError(format!("HTTP {} from {}", status.as_u16(), url))
}

impl PortalApi for CkanClient {
    async fn fetch_list(&self, action: &str) -> Result<Vec<String>, AppError> {
        let url = self.endpoint(&["api", "action", action])?;
        let resp = self.get(url.clone()).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, &url));
        }

        let ckan_resp: CkanResponse<Vec<String>> = self.read_json(resp).await?;
        if !ckan_resp.success {
            return Err(AppError::ClientError(format!(
                "CKAN {} returned success: false",
                action
            )));
        }

        Ok(ckan_resp.result)
    }

    async fn fetch_entity(&self, rest_path: &str, name: &str) -> Result<Value, AppError> {
        let url = self.endpoint(&["api", "rest", rest_path, name])?;
        let resp = self.get(url.clone()).await?;

        match resp.status() {
            status if status.is_success() => self.read_json(resp).await,
            StatusCode::NOT_FOUND => Err(AppError::EntityNotFound(format!(
                "{}/{}",
                rest_path, name
            ))),
            status => Err(status_error(status, &url)),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let parsed = Url::parse(url).map_err(|_| AppError::InvalidUrl(url.to_string()))?;
        let resp = self.get(parsed.clone()).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(status, &parsed));
        }

        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok(bytes.to_vec())
    }
}
