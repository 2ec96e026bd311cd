pub mod coerce;
pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;

pub use cpq::catalog::{load_or_empty, PriceTierSource, StaticPriceTierSource};
pub use cpq::periodicity::{apply_periodicity, DiscountReset, Periodicity, PeriodicityOption};
pub use cpq::pricing::{ensure_fully_priced, PricedQuote, PricingTrace, PricingTraceStep};
pub use cpq::rates::RateCard;
pub use cpq::{DeterministicQuoteEngine, QuoteEngine, QuoteSummary};
pub use domain::module::{ModuleConfig, ModuleId, ModuleRole, ModuleRoles, TierResolution};
pub use domain::price_tier::{PriceTierId, PriceTierRow, PriceTierTable};
pub use domain::product::{HardwareCatalog, ProductLine, ProductLineId, ProductTotals};
pub use domain::quote::{
    set_module_active, set_module_employees, set_product_quantity, ExtrasConfig, QuoteConfig,
    QuoteTotals,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
