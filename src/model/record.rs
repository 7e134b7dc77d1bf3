// src/model/record.rs

use serde::Serialize;
use tracing::warn;

/// One branch/product row as handed over by the ingestion layer.
///
/// Quantities are sanitized on construction: anything missing, non-numeric,
/// non-finite or negative becomes 0 so a single bad cell never fails the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub product_code: String,
    pub product_name: String,
    pub sales: f64,
    pub balance: f64,
}

impl RawRecord {
    pub fn new(
        product_code: impl Into<String>,
        product_name: impl Into<String>,
        sales: f64,
        balance: f64,
    ) -> Self {
        let product_code = product_code.into();
        let sales = checked_quantity(sales, "sales", &product_code);
        let balance = checked_quantity(balance, "balance", &product_code);
        Self {
            product_code,
            product_name: product_name.into(),
            sales,
            balance,
        }
    }

    /// Builds a record from untyped cells, e.g. a CSV row.
    pub fn parse(product_code: &str, product_name: &str, sales: &str, balance: &str) -> Self {
        let sales = parse_quantity(sales, "sales", product_code);
        let balance = parse_quantity(balance, "balance", product_code);
        Self::new(product_code.trim(), product_name.trim(), sales, balance)
    }
}

/// Clamps a quantity into the valid domain (finite, >= 0).
pub fn sanitize_quantity(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn checked_quantity(value: f64, field: &str, product_code: &str) -> f64 {
    let clean = sanitize_quantity(value);
    if clean != value && value != 0.0 {
        warn!(product = product_code, field, value, "invalid quantity replaced with 0");
    }
    clean
}

fn parse_quantity(text: &str, field: &str, product_code: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        warn!(product = product_code, field, "missing quantity replaced with 0");
        return 0.0;
    }
    match trimmed.replace(',', "").parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            warn!(product = product_code, field, text = trimmed, "non-numeric quantity replaced with 0");
            0.0
        }
    }
}

/// Derived stock position of one branch for one product.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StockMetrics {
    /// Daily sales rate over the period.
    pub avg_sales: f64,
    /// Target stock, rounded up.
    pub coverage_quantity: u32,
    /// Stock above target, rounded down.
    pub surplus_quantity: u32,
    /// Stock below target after suppression and capping.
    pub needed_quantity: u32,
}

/// The input record augmented with its stock metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchProductRecord {
    pub product_code: String,
    pub product_name: String,
    pub sales: f64,
    pub balance: f64,
    pub avg_sales: f64,
    pub coverage_quantity: u32,
    pub surplus_quantity: u32,
    pub needed_quantity: u32,
}

impl BranchProductRecord {
    pub fn from_parts(raw: &RawRecord, metrics: StockMetrics) -> Self {
        Self {
            product_code: raw.product_code.clone(),
            product_name: raw.product_name.clone(),
            sales: raw.sales,
            balance: raw.balance,
            avg_sales: metrics.avg_sales,
            coverage_quantity: metrics.coverage_quantity,
            surplus_quantity: metrics.surplus_quantity,
            needed_quantity: metrics.needed_quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_nan_quantities_become_zero() {
        let record = RawRecord::new("P1", "Paracetamol", -4.0, f64::NAN);
        assert_eq!(record.sales, 0.0);
        assert_eq!(record.balance, 0.0);
    }

    #[test]
    fn parse_is_lenient() {
        let record = RawRecord::parse(" P2 ", "Ibuprofen", "1,200", "abc");
        assert_eq!(record.product_code, "P2");
        assert_eq!(record.sales, 1200.0);
        assert_eq!(record.balance, 0.0);

        let blank = RawRecord::parse("P3", "Cetirizine", "", "  7.5 ");
        assert_eq!(blank.sales, 0.0);
        assert_eq!(blank.balance, 7.5);
    }
}
