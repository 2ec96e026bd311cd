use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::coerce;
use crate::domain::module::ModuleId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PriceTierId(pub String);

impl From<String> for PriceTierId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PriceTierId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for PriceTierId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        coerce::lenient_id(deserializer)
    }
}

/// One row of the externally supplied price scheme, effective up to `resource_number` seats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTierRow {
    #[serde(default)]
    pub id: PriceTierId,
    #[serde(default)]
    pub product_id: ModuleId,
    #[serde(default)]
    pub resource_id: ModuleId,
    #[serde(default, deserialize_with = "coerce::lenient_count")]
    pub resource_number: u32,
    #[serde(default, deserialize_with = "coerce::lenient_optional_id")]
    pub parent_id: Option<PriceTierId>,
    #[serde(default, deserialize_with = "coerce::lenient_decimal")]
    pub unit_price: Decimal,
}

/// Read-only price scheme. The engine only ever borrows it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTierTable {
    rows: Vec<PriceTierRow>,
}

impl PriceTierTable {
    pub fn new(rows: Vec<PriceTierRow>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[PriceTierRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tier candidates for `product_id` keyed against `resource_id`, ascending by threshold.
    pub fn candidates(&self, product_id: &ModuleId, resource_id: &ModuleId) -> Vec<&PriceTierRow> {
        let mut candidates: Vec<&PriceTierRow> = self
            .rows
            .iter()
            .filter(|row| &row.product_id == product_id && &row.resource_id == resource_id)
            .collect();
        candidates.sort_by_key(|row| row.resource_number);
        candidates
    }

    /// Row linked to `parent` for the same product (the included-users allowance).
    pub fn linked_to(&self, product_id: &ModuleId, parent: &PriceTierId) -> Option<&PriceTierRow> {
        self.rows
            .iter()
            .find(|row| &row.product_id == product_id && row.parent_id.as_ref() == Some(parent))
    }
}
