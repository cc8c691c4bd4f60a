//! HTTP client for the stack state service

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use cosmic_api::{
    requests::ListStacksParams,
    responses::{ExportResponse, ListStacksResponse, StackResponse},
};

use crate::error::{ClientError, Result};

/// Default state service endpoint
pub const DEFAULT_BACKEND_URL: &str = "https://api.pulumi.com";

/// Media type announcing the API version the client understands
pub const API_MEDIA_TYPE: &str = "application/vnd.pulumi+8";

/// HTTP client for communicating with the state service
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use cosmic_client::HttpClient;
    ///
    /// let client = HttpClient::new("https://api.pulumi.com")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self {
            client,
            base_url,
            access_token: None,
        })
    }

    /// Send `Authorization: token <t>` with every request
    #[must_use]
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL from path segments, escaping each one
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Perform a GET request and deserialize the response
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let mut request = self.client.get(url).header(ACCEPT, API_MEDIA_TYPE);
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// URL of the stack listing with its query pairs
    fn list_stacks_url(&self, params: &ListStacksParams) -> Result<Url> {
        let mut url = self.url(&["api", "user", "stacks"])?;
        let pairs = params.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// URL of a single stack, optionally followed by a sub-resource
    fn stack_url(&self, org: &str, project: &str, stack: &str, tail: Option<&str>) -> Result<Url> {
        let mut segments = vec!["api", "stacks", org, project, stack];
        segments.extend(tail);
        self.url(&segments)
    }

    /// List stacks visible to the caller
    ///
    /// Only the page selected by `params` is returned.
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    #[instrument(skip(self))]
    pub async fn list_stacks_page(&self, params: &ListStacksParams) -> Result<ListStacksResponse> {
        let response: ListStacksResponse = self.get(self.list_stacks_url(params)?).await?;
        if response.continuation_token.is_some() {
            debug!(stacks = response.stacks.len(), "stack listing has further pages");
        }
        Ok(response)
    }

    /// Get a single stack's metadata
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    #[instrument(skip(self))]
    pub async fn stack_metadata(
        &self,
        org: &str,
        project: &str,
        stack: &str,
    ) -> Result<StackResponse> {
        self.get(self.stack_url(org, project, stack, None)?).await
    }

    /// Export a stack's current deployment
    ///
    /// # Errors
    /// Returns an error if the request fails or the service returns an error.
    #[instrument(skip(self))]
    pub async fn export_stack(
        &self,
        org: &str,
        project: &str,
        stack: &str,
    ) -> Result<ExportResponse> {
        self.get(self.stack_url(org, project, stack, Some("export"))?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(DEFAULT_BACKEND_URL);
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        assert!(HttpClient::new("not a url").is_err());
        assert!(HttpClient::new("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = HttpClient::new(DEFAULT_BACKEND_URL)
            .unwrap()
            .with_access_token(Some(String::new()));
        assert!(client.access_token.is_none());
    }

    #[test]
    fn test_list_stacks_url() {
        let client = HttpClient::new("http://localhost:8080").unwrap();

        let url = client.list_stacks_url(&ListStacksParams::default()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/user/stacks");

        let params = ListStacksParams {
            organization: Some("acme".into()),
            project: Some("web".into()),
            continuation_token: None,
        };
        let url = client.list_stacks_url(&params).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/user/stacks?organization=acme&project=web"
        );
    }

    #[test]
    fn test_stack_urls() {
        let client = HttpClient::new("http://localhost:8080").unwrap();

        let url = client.stack_url("acme", "web", "prod", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/stacks/acme/web/prod");

        let url = client.stack_url("acme", "web", "prod", Some("export")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/stacks/acme/web/prod/export");
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = HttpClient::new("https://state.internal/pulumi/").unwrap();
        let url = client.stack_url("acme", "web", "prod", Some("export")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://state.internal/pulumi/api/stacks/acme/web/prod/export"
        );
    }

    #[test]
    fn test_segments_are_escaped() {
        let client = HttpClient::new("http://localhost:8080").unwrap();
        let url = client.stack_url("acme", "web app", "prod", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/stacks/acme/web%20app/prod");
    }
}
