use rust_decimal::Decimal;

use crate::cpq::money::{saturating_add, saturating_mul};
use crate::cpq::rates::RateCard;
use crate::domain::product::{ProductLine, ProductTotals};

/// Hardware totals. Quantities are integral so nothing is rounded here, and neither periodicity
/// nor the quote discount takes part.
pub fn calculate_products(lines: &[ProductLine], rates: &RateCard) -> ProductTotals {
    let lines: Vec<ProductLine> = lines
        .iter()
        .map(|line| ProductLine {
            line_total: saturating_mul(line.unit_price, Decimal::from(line.quantity)),
            ..line.clone()
        })
        .collect();

    let subtotal_products =
        lines.iter().map(|line| line.line_total).fold(Decimal::ZERO, saturating_add);
    let tax_products = saturating_mul(subtotal_products, rates.tax_rate);
    let total_products = saturating_add(subtotal_products, tax_products);

    ProductTotals { lines, subtotal_products, tax_products, total_products }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::calculate_products;
    use crate::cpq::rates::RateCard;
    use crate::domain::product::{HardwareCatalog, ProductLine};

    #[test]
    fn three_units_at_one_hundred() {
        let lines = vec![ProductLine::new("1", "reader", Decimal::from(100)).with_quantity(3)];

        let totals = calculate_products(&lines, &RateCard::default());

        assert_eq!(totals.lines[0].line_total, Decimal::from(300));
        assert_eq!(totals.subtotal_products, Decimal::from(300));
        assert_eq!(totals.tax_products, Decimal::from(48));
        assert_eq!(totals.total_products, Decimal::from(348));
    }

    #[test]
    fn unrounded_catalog_prices_keep_full_precision() {
        let lines: Vec<ProductLine> = HardwareCatalog::default_lines()
            .into_iter()
            .map(|line| if line.id.0 == "5" { line.with_quantity(1) } else { line })
            .collect();

        let totals = calculate_products(&lines, &RateCard::default());

        assert_eq!(totals.subtotal_products, Decimal::new(1_206_032, 3));
        assert_eq!(totals.tax_products, Decimal::new(19_296_512, 5));
    }

    #[test]
    fn stale_line_totals_are_recomputed() {
        let mut line = ProductLine::new("9", "portable", Decimal::from(4500));
        line.line_total = Decimal::from(999);

        let totals = calculate_products(&[line], &RateCard::default());
        assert!(totals.total_products.is_zero());
        assert!(totals.lines[0].line_total.is_zero());
    }

    #[test]
    fn oversized_price_saturates_line_and_totals() {
        let price: Decimal = "10000000000000000000000000000".parse().expect("price in range");
        let lines = vec![
            ProductLine::new("1", "reader", price).with_quantity(60),
            ProductLine::new("2", "reader", Decimal::from(100)).with_quantity(1),
        ];

        let totals = calculate_products(&lines, &RateCard::default());

        assert_eq!(totals.lines[0].line_total, Decimal::MAX);
        assert_eq!(totals.subtotal_products, Decimal::MAX);
        assert_eq!(totals.total_products, Decimal::MAX);
    }
}
