//! Run Record - lifecycle of one pass over a dataset

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display state of the experiment.
///
/// `Idle` shows the upload view, `Running` the progress view, `Complete` the
/// finished run. Resetting only flips the display back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// No run in progress.
    #[default]
    Idle,
    /// Rows are being submitted.
    Running,
    /// All rows measured.
    Complete,
}

/// Run Record describes one execution of the experiment loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    run_id: String,
    dataset: String,
    row_count: usize,
    state: RunState,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    /// Create a run record in Idle state.
    ///
    /// # Arguments
    ///
    /// * `run_id` - Unique identifier for the run
    /// * `dataset` - Name of the input dataset
    /// * `row_count` - Rows the run will process
    #[must_use]
    pub fn new(run_id: impl Into<String>, dataset: impl Into<String>, row_count: usize) -> Self {
        Self {
            run_id: run_id.into(),
            dataset: dataset.into(),
            row_count,
            state: RunState::Idle,
            started_at: None,
            ended_at: None,
        }
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the dataset name.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Rows in the dataset.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the current state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Get the start timestamp, if the run has started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the run has completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Wall time between start and completion.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.ended_at? - self.started_at?)
    }

    /// Transition to Running and stamp `started_at`.
    pub fn start(&mut self) {
        self.state = RunState::Running;
        self.started_at = Some(Utc::now());
    }

    /// Transition to Complete and stamp `ended_at`.
    pub fn complete(&mut self) {
        self.state = RunState::Complete;
        self.ended_at = Some(Utc::now());
    }
}
