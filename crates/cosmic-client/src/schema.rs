//! Provider schema source for shell completion

use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;
use url::Url;

use cosmic_api::schema::ProviderSchema;
use cosmic_inventory::{InventoryError, SchemaSource};

use crate::error::{ClientError, Result};

/// Default location of published provider schemas
pub const DEFAULT_SCHEMA_URL: &str = "https://raw.githubusercontent.com/pulumi/";

/// Fetches provider schemas from their source repositories
///
/// Every lookup is a fresh request; nothing is cached.
#[derive(Debug, Clone)]
pub struct SchemaClient {
    client: Client,
    base_url: Url,
}

impl SchemaClient {
    /// Create a new schema client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Location of a provider's `schema.json`
    fn schema_url(&self, provider: &str) -> Result<Url> {
        let repo = format!("pulumi-{provider}");
        let plugin = format!("pulumi-resource-{provider}");

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend([
                repo.as_str(),
                "master",
                "provider",
                "cmd",
                plugin.as_str(),
                "schema.json",
            ]);
        Ok(url)
    }

    /// Download and parse a provider schema
    ///
    /// # Errors
    /// Returns an error if the request fails or the body is not a schema.
    #[instrument(skip(self))]
    pub async fn fetch(&self, provider: &str) -> Result<ProviderSchema> {
        let response = self.client.get(self.schema_url(provider)?).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl SchemaSource for SchemaClient {
    async fn provider_schema(&self, provider: &str) -> std::result::Result<ProviderSchema, InventoryError> {
        self.fetch(provider)
            .await
            .map_err(|e| InventoryError::Schema {
                provider: provider.to_string(),
                message: e.to_string(),
            })
    }
}
