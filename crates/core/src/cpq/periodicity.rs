use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::coerce;
use crate::domain::quote::QuoteConfig;

/// Billing frequency. Closed set: there is no custom multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Periodicity {
    #[default]
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodicityOption {
    pub id: u8,
    pub label: &'static str,
    pub multiplier: u32,
    pub default_discount_percent: Decimal,
}

/// What to do with the current discount when the billing frequency changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiscountReset {
    /// Overwrite the discount with the new periodicity's default.
    #[default]
    ApplyDefault,
    /// Keep a manually entered discount.
    KeepManual,
}

impl Periodicity {
    pub fn all() -> [Periodicity; 4] {
        [Self::Monthly, Self::Quarterly, Self::Semiannual, Self::Annual]
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 2,
            Self::Semiannual => 3,
            Self::Annual => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Semiannual => "Semiannual",
            Self::Annual => "Annual",
        }
    }

    pub fn multiplier(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Semiannual => 6,
            Self::Annual => 12,
        }
    }

    pub fn default_discount_percent(self) -> Decimal {
        match self {
            Self::Monthly => Decimal::ZERO,
            Self::Quarterly => Decimal::new(5, 0),
            Self::Semiannual => Decimal::new(10, 0),
            Self::Annual => Decimal::new(15, 0),
        }
    }

    pub fn option(self) -> PeriodicityOption {
        PeriodicityOption {
            id: self.id(),
            label: self.label(),
            multiplier: self.multiplier(),
            default_discount_percent: self.default_discount_percent(),
        }
    }

    pub fn options() -> Vec<PeriodicityOption> {
        Self::all().into_iter().map(Self::option).collect()
    }

    /// Resolves a numeric id or a case-insensitive label; anything else is the first entry.
    pub fn from_selector(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::all()
            .into_iter()
            .find(|periodicity| periodicity.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::from_id(coerce::count_from_decimal(coerce::parse_decimal(trimmed))))
    }

    pub fn from_id(id: u32) -> Self {
        Self::all().into_iter().find(|periodicity| u32::from(periodicity.id()) == id).unwrap_or_default()
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::from_selector(text),
            other => Self::from_id(coerce::count_from_value(other)),
        }
    }
}

impl Serialize for Periodicity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for Periodicity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Switches billing frequency. With [`DiscountReset::ApplyDefault`] the discount is replaced by
/// the new periodicity's default, discarding any manual edit.
pub fn apply_periodicity(
    config: &QuoteConfig,
    periodicity: Periodicity,
    reset: DiscountReset,
) -> QuoteConfig {
    let discount_percent = match reset {
        DiscountReset::ApplyDefault => periodicity.default_discount_percent(),
        DiscountReset::KeepManual => config.discount_percent,
    };

    QuoteConfig { periodicity, discount_percent, ..config.clone() }
}
