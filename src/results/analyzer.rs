//! Results analyzer - per-variant means and relative improvement

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{error, warn};

use super::table::{Metric, ResultsTable};
use super::ResultsStore;
use crate::contract::ContractVariant;
use crate::Result;

/// Relative saving of the lightweight contract over the basic one, in
/// percent. `None` when the basic mean is zero (or the result is not
/// finite), since the ratio is undefined there.
#[must_use]
pub fn improvement_pct(basic_mean: f64, lightweight_mean: f64) -> Option<f64> {
    if basic_mean == 0.0 {
        return None;
    }
    let pct = (basic_mean - lightweight_mean) / basic_mean * 100.0;
    pct.is_finite().then_some(pct)
}

/// One line of the summary table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryRow {
    /// Compared quantity
    pub metric: Metric,
    /// Mean over the basic contract's records
    pub basic_mean: f64,
    /// Mean over the lightweight contract's records
    pub lightweight_mean: f64,
    /// See [`improvement_pct`]
    pub improvement_pct: Option<f64>,
}

/// Aggregates over a results table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    rows: Vec<SummaryRow>,
    basic_count: usize,
    lightweight_count: usize,
}

impl Summary {
    /// Rows in [`Metric::ALL`] order.
    #[must_use]
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Row for one metric.
    #[must_use]
    pub fn row(&self, metric: Metric) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.metric == metric)
    }

    /// Records measured on the basic contract.
    #[must_use]
    pub const fn basic_count(&self) -> usize {
        self.basic_count
    }

    /// Records measured on the lightweight contract.
    #[must_use]
    pub const fn lightweight_count(&self) -> usize {
        self.lightweight_count
    }

    /// Export as CSV: `Operation,BasicContract,LightweightContract,Improvement (%)`.
    /// An undefined improvement is written as an empty cell.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "Operation",
            ContractVariant::Basic.contract_name(),
            ContractVariant::Lightweight.contract_name(),
            "Improvement (%)",
        ])?;
        for row in &self.rows {
            writer.write_record([
                row.metric.label().to_string(),
                row.basic_mean.to_string(),
                row.lightweight_mean.to_string(),
                row.improvement_pct.map(|p| p.to_string()).unwrap_or_default(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Index-level pairing problems in a results table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Indices lacking a record for a variant
    pub missing: Vec<(usize, ContractVariant)>,
    /// Indices with more than one record for a variant
    pub duplicated: Vec<(usize, ContractVariant)>,
    /// Contract names that are neither variant
    pub unknown_contracts: Vec<String>,
}

impl Coverage {
    /// True when every index has exactly one record per variant.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty() && self.unknown_contracts.is_empty()
    }
}

/// Loads results and computes the comparison.
#[derive(Debug, Clone)]
pub struct Analyzer {
    store: ResultsStore,
}

impl Analyzer {
    /// Analyzer over a results store.
    #[must_use]
    pub const fn new(store: ResultsStore) -> Self {
        Self { store }
    }

    /// Load the results file as a table. `None` (with a warning or error
    /// logged) when the file is absent or unreadable.
    #[must_use]
    pub fn load(&self) -> Option<ResultsTable> {
        let records = self.store.load()?;
        match ResultsTable::from_records(&records) {
            Ok(table) => Some(table),
            Err(e) => {
                error!("Error loading experiment data: {e}");
                None
            }
        }
    }

    /// Per-metric means and improvements.
    ///
    /// Returns `None` with a warning when the table is empty or one of the
    /// two variants has no records.
    #[must_use]
    pub fn summarize(table: &ResultsTable) -> Option<Summary> {
        if table.is_empty() {
            warn!("No data to analyze");
            return None;
        }
        match Self::try_summarize(table) {
            Ok(summary) => summary,
            Err(e) => {
                error!("Error analyzing experiment data: {e}");
                None
            }
        }
    }

    fn try_summarize(table: &ResultsTable) -> Result<Option<Summary>> {
        let basic = table.partition(ContractVariant::Basic)?;
        let light = table.partition(ContractVariant::Lightweight)?;
        if basic.is_empty() || light.is_empty() {
            warn!(
                basic = basic.num_rows(),
                lightweight = light.num_rows(),
                "Missing data for one or both contract types"
            );
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(Metric::ALL.len());
        for metric in Metric::ALL {
            let (Some(basic_mean), Some(lightweight_mean)) =
                (basic.mean(metric)?, light.mean(metric)?)
            else {
                return Ok(None);
            };
            rows.push(SummaryRow {
                metric,
                basic_mean,
                lightweight_mean,
                improvement_pct: improvement_pct(basic_mean, lightweight_mean),
            });
        }

        Ok(Some(Summary {
            rows,
            basic_count: basic.num_rows(),
            lightweight_count: light.num_rows(),
        }))
    }

    /// Check that every index was measured exactly once on each variant.
    ///
    /// # Errors
    ///
    /// Returns error if the table columns cannot be read.
    pub fn coverage(table: &ResultsTable) -> Result<Coverage> {
        let mut counts: BTreeMap<usize, [usize; 2]> = BTreeMap::new();
        let mut coverage = Coverage::default();

        for record in table.to_records()? {
            match ContractVariant::from_contract_name(record.contract_name()) {
                Some(variant) => {
                    let slot = usize::from(variant == ContractVariant::Lightweight);
                    counts.entry(record.index()).or_default()[slot] += 1;
                }
                None => {
                    if !coverage.unknown_contracts.iter().any(|n| n == record.contract_name()) {
                        coverage.unknown_contracts.push(record.contract_name().to_string());
                    }
                }
            }
        }

        for (index, per_variant) in counts {
            for (variant, count) in ContractVariant::ALL.into_iter().zip(per_variant) {
                match count {
                    0 => coverage.missing.push((index, variant)),
                    1 => {}
                    _ => coverage.duplicated.push((index, variant)),
                }
            }
        }

        Ok(coverage)
    }
}

/// Five-number summary behind a box plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    /// Smallest value
    pub min: f64,
    /// 25th percentile
    pub q1: f64,
    /// 50th percentile
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
    /// Largest value
    pub max: f64,
}

impl BoxStats {
    /// Quartiles with linear interpolation between closest ranks. `None` for
    /// an empty slice.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
