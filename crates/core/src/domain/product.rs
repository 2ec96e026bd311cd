use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::coerce;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductLineId(pub String);

impl From<String> for ProductLineId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProductLineId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ProductLineId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        coerce::lenient_id(deserializer)
    }
}

/// Fixed-catalog hardware line billed once, outside the subscription periodicity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    #[serde(default)]
    pub id: ProductLineId,
    /// Catalog item the line refers to. Persisted records carry their own row `id` plus this key.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "coerce::lenient_optional_id"
    )]
    pub product_id: Option<ProductLineId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "price", deserialize_with = "coerce::lenient_decimal")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "coerce::lenient_count")]
    pub quantity: u32,
    #[serde(default, alias = "total", deserialize_with = "coerce::lenient_decimal")]
    pub line_total: Decimal,
}

impl ProductLine {
    pub fn new(id: impl Into<ProductLineId>, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id: id.into(),
            product_id: None,
            name: name.into(),
            unit_price,
            quantity: 0,
            line_total: Decimal::ZERO,
        }
    }

    /// Key used to match the line against the hardware catalog: `productId` when present,
    /// otherwise the line `id`.
    pub fn catalog_id(&self) -> &ProductLineId {
        self.product_id.as_ref().unwrap_or(&self.id)
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotals {
    pub lines: Vec<ProductLine>,
    pub subtotal_products: Decimal,
    pub tax_products: Decimal,
    pub total_products: Decimal,
}

pub struct HardwareCatalog;

impl HardwareCatalog {
    /// Hardware offered on every new quote, all at quantity zero.
    pub fn default_lines() -> Vec<ProductLine> {
        [
            ("1", "ZKTECO Horus E1", Decimal::new(797_414, 2)),
            ("7", "Hikvision DSK1T343MWX", Decimal::new(2500, 0)),
            ("2", "ZKTECO SpeedFace V5LP", Decimal::new(688_793, 2)),
            ("3", "ZKTECO SpeedFace V5LPWIFI", Decimal::new(688_793, 2)),
            ("4", "ZKTECO MB10VL", Decimal::new(237_069, 2)),
            ("5", "Batería de Respaldo Mini", Decimal::new(1_206_032, 3)),
            ("6", "Plan Datos Renta Mensual Tarjeta SIM Telcel", Decimal::new(150, 0)),
            ("8", "DAHUA DHI-ASI3214A-W (FIJO)", Decimal::new(3500, 0)),
            ("9", "DAHUA DHI-ASI3214A-W (PORTATIL)", Decimal::new(4500, 0)),
        ]
        .into_iter()
        .map(|(id, name, unit_price)| ProductLine::new(id, name, unit_price))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{HardwareCatalog, ProductLine, ProductLineId};

    #[test]
    fn default_catalog_starts_with_zero_quantities() {
        let lines = HardwareCatalog::default_lines();

        assert_eq!(lines.len(), 9);
        assert!(lines.iter().all(|line| line.quantity == 0 && line.line_total.is_zero()));
        assert_eq!(lines[0].unit_price, Decimal::new(797_414, 2));
    }

    #[test]
    fn product_line_accepts_numeric_id_and_text_quantity() {
        let line: ProductLine = serde_json::from_value(json!({
            "id": 6,
            "name": "SIM",
            "price": 150,
            "quantity": "4"
        }))
        .expect("line should deserialize");

        assert_eq!(line.id, ProductLineId::from("6"));
        assert_eq!(line.unit_price, Decimal::from(150));
        assert_eq!(line.quantity, 4);
        assert_eq!(line.catalog_id(), &ProductLineId::from("6"));
    }

    #[test]
    fn saved_line_without_row_id_is_keyed_by_product_id() {
        let line: ProductLine = serde_json::from_value(json!({
            "productId": 6,
            "price": 150,
            "quantity": 3
        }))
        .expect("saved line should deserialize");

        assert_eq!(line.id, ProductLineId::default());
        assert_eq!(line.catalog_id(), &ProductLineId::from("6"));
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn server_row_id_does_not_shadow_product_id() {
        let line: ProductLine = serde_json::from_value(json!({
            "id": 812,
            "productId": 6,
            "quantity": 3
        }))
        .expect("server line should deserialize");

        assert_eq!(line.id, ProductLineId::from("812"));
        assert_eq!(line.catalog_id(), &ProductLineId::from("6"));
    }
}
