use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use cotizador_core::config::CatalogConfig;
use cotizador_core::{ApplicationError, PriceTierSource, PriceTierTable};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

pub const PRICE_SCHEME_PATH: &str = "/administration/ProductPriceScheme";

/// Remote price scheme served by the administration API.
#[derive(Clone, Debug)]
pub struct HttpPriceTierSource {
    client: Client,
    endpoint: String,
    api_token: Option<SecretString>,
    timeout: Duration,
}

impl HttpPriceTierSource {
    pub fn new(base_url: &str, api_token: Option<SecretString>, timeout: Duration) -> Self {
        let endpoint = format!("{}{PRICE_SCHEME_PATH}", base_url.trim_end_matches('/'));
        Self { client: Client::new(), endpoint, api_token, timeout }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PriceTierSource for HttpPriceTierSource {
    async fn fetch_price_tiers(&self) -> Result<PriceTierTable, ApplicationError> {
        let mut request = self.client.get(&self.endpoint).timeout(self.timeout);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret()); // ubs:ignore
        }

        debug!(event_name = "catalog.http.request", endpoint = %self.endpoint, "fetching price tiers");

        let response = request.send().await.map_err(|error| {
            ApplicationError::Catalog(format!("request to `{}` failed: {error}", self.endpoint))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApplicationError::Catalog(format!(
                "`{}` returned status {status}",
                self.endpoint
            )));
        }

        response.json::<PriceTierTable>().await.map_err(|error| {
            ApplicationError::Catalog(format!("price scheme payload is not a tier list: {error}"))
        })
    }
}

/// Price scheme exported to a local JSON file, in the same shape the API returns.
#[derive(Clone, Debug)]
pub struct FilePriceTierSource {
    path: PathBuf,
}

impl FilePriceTierSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PriceTierSource for FilePriceTierSource {
    async fn fetch_price_tiers(&self) -> Result<PriceTierTable, ApplicationError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|error| {
            ApplicationError::Catalog(format!("could not read `{}`: {error}", self.path.display()))
        })?;

        serde_json::from_str::<PriceTierTable>(&raw).map_err(|error| {
            ApplicationError::Catalog(format!(
                "`{}` is not a price tier list: {error}",
                self.path.display()
            ))
        })
    }
}

/// Picks the tier source for a run. An explicit file wins over the configured file, which wins
/// over the remote catalog. `None` means no source is configured.
pub fn select_source(
    catalog: &CatalogConfig,
    tiers_override: Option<PathBuf>,
) -> Option<Box<dyn PriceTierSource>> {
    if let Some(path) = tiers_override.or_else(|| catalog.tiers_path.clone()) {
        return Some(Box::new(FilePriceTierSource::new(path)));
    }

    catalog.base_url.as_deref().map(|base_url| {
        Box::new(HttpPriceTierSource::new(
            base_url,
            catalog.api_token.clone(),
            Duration::from_secs(catalog.timeout_secs),
        )) as Box<dyn PriceTierSource>
    })
}
