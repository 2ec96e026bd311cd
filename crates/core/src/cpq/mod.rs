pub mod catalog;
pub mod discount;
pub mod money;
pub mod periodicity;
pub mod pricing;
pub mod products;
pub mod rates;
pub mod stamps;
pub mod tiers;
pub mod totals;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::module::ModuleRoles;
use crate::domain::price_tier::PriceTierTable;
use crate::domain::product::{ProductLine, ProductTotals};
use crate::domain::quote::QuoteConfig;

use self::{pricing::PricedQuote, rates::RateCard};

/// Both pricing pipelines merged, as presented to the sales agent after every edit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub quote: PricedQuote,
    pub products: ProductTotals,
    pub grand_total: Decimal,
}

pub trait QuoteEngine: Send + Sync {
    fn calculate_totals(&self, config: &QuoteConfig) -> PricedQuote;

    fn calculate_products(&self, lines: &[ProductLine]) -> ProductTotals;

    fn recalculate_all(&self, config: &QuoteConfig) -> QuoteSummary {
        let quote = self.calculate_totals(config);
        let products = self.calculate_products(&quote.config.product_lines);
        let grand_total = money::saturating_add(quote.totals.total, products.total_products);

        QuoteSummary { quote, products, grand_total }
    }
}

/// Stateless engine over an immutable price scheme. Identical inputs always give identical output.
#[derive(Clone, Debug, Default)]
pub struct DeterministicQuoteEngine {
    tiers: PriceTierTable,
    roles: ModuleRoles,
    rates: RateCard,
}

impl DeterministicQuoteEngine {
    pub fn new(tiers: PriceTierTable, roles: ModuleRoles, rates: RateCard) -> Self {
        Self { tiers, roles, rates }
    }

    pub fn tiers(&self) -> &PriceTierTable {
        &self.tiers
    }

    pub fn roles(&self) -> &ModuleRoles {
        &self.roles
    }

    pub fn rates(&self) -> &RateCard {
        &self.rates
    }
}

impl QuoteEngine for DeterministicQuoteEngine {
    fn calculate_totals(&self, config: &QuoteConfig) -> PricedQuote {
        pricing::calculate_totals(config, &self.tiers, &self.roles, &self.rates)
    }

    fn calculate_products(&self, lines: &[ProductLine]) -> ProductTotals {
        products::calculate_products(lines, &self.rates)
    }
}
