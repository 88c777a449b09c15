//! Synthetic sales dataset generation.
//!
//! Produces a realistic-looking order book for demos and tests: order sizes
//! are log-normal per category, margins are normal per category (so a share
//! of orders lose money), and dates are spread uniformly over the window.

use std::path::Path;

use chrono::{Duration, Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::SalesRecord;
use crate::error::AppError;

/// First order id; ids are consecutive integers from here.
const FIRST_ORDER_ID: u64 = 100_001;

/// `(name, log-mean of order size, log-sd, mean margin, margin sd)`.
const CATEGORY_PROFILES: [(&str, f64, f64, f64, f64); 3] = [
    ("Furniture", 5.6, 0.8, 0.04, 0.18),
    ("Office Supplies", 4.2, 0.9, 0.16, 0.12),
    ("Technology", 6.0, 0.9, 0.17, 0.15),
];

const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    /// First day of the first month covered.
    pub start: NaiveDate,
    pub months: u32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 500,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
            months: 12,
        }
    }
}

/// Generate `config.rows` records. Same config, same records.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SalesRecord>, AppError> {
    if config.rows == 0 {
        return Err(AppError::new(2, "Sample row count must be > 0."));
    }
    if config.months == 0 {
        return Err(AppError::new(2, "Sample month count must be > 0."));
    }

    let end = config
        .start
        .checked_add_months(Months::new(config.months))
        .ok_or_else(|| AppError::new(2, "Sample window overflows the calendar."))?;
    let span_days = (end - config.start).num_days();

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut profiles = Vec::with_capacity(CATEGORY_PROFILES.len());
    for (name, mu, sigma, margin_mean, margin_sd) in CATEGORY_PROFILES {
        let size = LogNormal::new(mu, sigma)
            .map_err(|e| AppError::new(4, format!("Order size distribution error: {e}")))?;
        let margin = Normal::new(margin_mean, margin_sd)
            .map_err(|e| AppError::new(4, format!("Margin distribution error: {e}")))?;
        profiles.push((name, size, margin));
    }

    let mut records = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        let (category, size, margin) = &profiles[rng.gen_range(0..profiles.len())];
        let region = REGIONS[rng.gen_range(0..REGIONS.len())];

        let sales = round_cents(size.sample(&mut rng));
        // Clamp to keep pathological draws from exceeding the order value.
        let margin = margin.sample(&mut rng).clamp(-0.9, 0.6);
        let profit = round_cents(sales * margin);

        let order_date = config.start + Duration::days(rng.gen_range(0..span_days));
        let order_id = (FIRST_ORDER_ID + i as u64).to_string();

        records.push(SalesRecord::new(order_id, region, *category, sales, profit, order_date));
    }

    records.sort_by_key(|r| r.order_date);
    Ok(records)
}

/// Write records using the canonical input headers, so the file loads back.
pub fn write_sample_csv(path: &Path, records: &[SalesRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    let write_err = |e: csv::Error| AppError::new(4, format!("Failed to write sample CSV: {e}"));

    writer
        .write_record(["Order ID", "Region", "Category", "Sales", "Profit", "Order Date"])
        .map_err(write_err)?;

    for r in records {
        writer
            .write_record([
                r.order_id.clone(),
                r.region.clone(),
                r.category.clone(),
                format!("{:.2}", r.sales),
                format!("{:.2}", r.profit),
                r.order_date.format("%Y-%m-%d").to_string(),
            ])
            .map_err(write_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_dataset;

    #[test]
    fn same_seed_same_sample() {
        let config = SampleConfig {
            rows: 50,
            ..Default::default()
        };
        assert_eq!(generate_sample(&config).unwrap(), generate_sample(&config).unwrap());
    }

    #[test]
    fn sample_respects_invariants_and_window() {
        let config = SampleConfig {
            rows: 300,
            seed: 9,
            months: 6,
            ..Default::default()
        };
        let records = generate_sample(&config).unwrap();
        assert_eq!(records.len(), 300);

        let end = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        for r in &records {
            assert!(r.sales >= 0.0);
            assert!(r.profit.is_finite());
            assert!(r.order_date >= config.start && r.order_date < end);
        }
        assert!(records.windows(2).all(|w| w[0].order_date <= w[1].order_date));
    }

    #[test]
    fn zero_rows_is_rejected() {
        let config = SampleConfig {
            rows: 0,
            ..Default::default()
        };
        assert_eq!(generate_sample(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn written_sample_loads_back() {
        let path = std::env::temp_dir().join(format!("sales_insights_{}_sample_roundtrip.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let records = generate_sample(&SampleConfig {
            rows: 40,
            ..Default::default()
        })
        .unwrap();
        write_sample_csv(&path, &records).unwrap();

        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.rows_used(), 40);
        assert!(ds.warnings.is_empty());

        std::fs::remove_file(&path).unwrap();
    }
}
