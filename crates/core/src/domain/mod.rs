pub mod module;
pub mod price_tier;
pub mod product;
pub mod quote;
