//! Results persistence, aggregation and reporting
//!
//! Records written by the experiment driver land in a single CSV file
//! ([`ResultsStore`]). The analyzer loads them into a columnar
//! [`ResultsTable`], partitions by contract variant and compares the means
//! of each [`Metric`]. [`report`] turns the outcome into terminal output.

mod analyzer;
pub mod report;
mod store;
mod table;

pub use analyzer::{improvement_pct, Analyzer, BoxStats, Coverage, Summary, SummaryRow};
pub use store::{ResultsStore, RESULTS_FILE_NAME};
pub use table::{Metric, ResultsTable};
