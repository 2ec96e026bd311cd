use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::price_tier::PriceTierTable;
use crate::errors::ApplicationError;

/// Supplier of the price scheme, fetched once per session before the first recomputation.
#[async_trait]
pub trait PriceTierSource: Send + Sync {
    async fn fetch_price_tiers(&self) -> Result<PriceTierTable, ApplicationError>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticPriceTierSource {
    table: PriceTierTable,
}

impl StaticPriceTierSource {
    pub fn new(table: PriceTierTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl PriceTierSource for StaticPriceTierSource {
    async fn fetch_price_tiers(&self) -> Result<PriceTierTable, ApplicationError> {
        Ok(self.table.clone())
    }
}

/// Fetches the price scheme, degrading to an empty table on failure. Pricing against an empty
/// table is valid and produces zero module totals.
pub async fn load_or_empty(source: &dyn PriceTierSource) -> PriceTierTable {
    match source.fetch_price_tiers().await {
        Ok(table) => {
            info!(
                event_name = "catalog.price_tiers.loaded",
                rows = table.len(),
                "price tiers loaded"
            );
            table
        }
        Err(error) => {
            warn!(
                event_name = "catalog.price_tiers.unavailable",
                error = %error,
                "price tiers unavailable; pricing against an empty table"
            );
            PriceTierTable::empty()
        }
    }
}
