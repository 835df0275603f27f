//! Thread-safe collection point for non-fatal batch errors.
//!
//! One [`ErrorAggregator`] lives for one batch run. Workers share it by
//! reference and append whatever went wrong with their records; the caller
//! takes an [`ErrorSnapshot`] once the run is done.
//!
//! A single `parking_lot::Mutex` serializes appends, clears and snapshots:
//!
//! - a batch passed to [`ErrorAggregator::add_errors`] lands contiguously
//! - one caller's appends keep their order; ordering across callers is
//!   whatever the lock handed out
//! - nothing here can fail, there is no poisoning to recover from

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Serialize, Serializer};

use crate::domain::{Classification, OutputError, RecordKind};

/// Append-only, thread-safe sink for [`OutputError`]s.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    classification: Option<Classification>,
    errors: Mutex<Vec<OutputError>>,
}

impl ErrorAggregator {
    /// Create an aggregator.
    ///
    /// With `Some(tag)`, every appended error is re-tagged with `tag`,
    /// replacing whatever classification it carried.
    pub fn new(classification: Option<Classification>) -> Self {
        Self {
            classification,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Aggregator that stamps every error with `tag`.
    pub fn tagged(tag: impl Into<Classification>) -> Self {
        Self::new(Some(tag.into()))
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn add_error(&self, error: OutputError) {
        let error = self.stamp(error);
        self.errors.lock().push(error);
    }

    /// Append a batch under one lock acquisition. `None` is a no-op.
    pub fn add_errors<I>(&self, errors: Option<I>)
    where
        I: IntoIterator<Item = OutputError>,
    {
        let Some(errors) = errors else {
            return;
        };

        // Tag outside the lock.
        let batch: Vec<OutputError> = errors.into_iter().map(|e| self.stamp(e)).collect();
        if batch.is_empty() {
            return;
        }

        self.errors.lock().extend(batch);
    }

    /// Independent snapshot of everything appended so far.
    pub fn all_errors(&self) -> ErrorSnapshot {
        let guard = self.errors.lock();
        ErrorSnapshot(Arc::from(guard.as_slice()))
    }

    pub fn clear(&self) {
        self.errors.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stamp(&self, error: OutputError) -> OutputError {
        match &self.classification {
            Some(tag) => error.with_classification(tag.clone()),
            None => error,
        }
    }
}

/// Immutable view of an aggregator's contents at one point in time.
///
/// Later appends or clears on the aggregator never show up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSnapshot(Arc<[OutputError]>);

impl ErrorSnapshot {
    /// Errors reported against one timer record.
    pub fn for_record(&self, record_id: u32) -> impl Iterator<Item = &OutputError> + '_ {
        self.matching(RecordKind::Timer, record_id)
    }

    /// Errors reported against one process step.
    pub fn for_step(&self, step_id: u32) -> impl Iterator<Item = &OutputError> + '_ {
        self.matching(RecordKind::Step, step_id)
    }

    fn matching(&self, kind: RecordKind, id: u32) -> impl Iterator<Item = &OutputError> + '_ {
        self.0
            .iter()
            .filter(move |e| e.kind() == kind && e.record_id() == id)
    }

    pub fn to_vec(&self) -> Vec<OutputError> {
        self.0.to_vec()
    }
}

impl Deref for ErrorSnapshot {
    type Target = [OutputError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for ErrorSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl Default for ErrorSnapshot {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}
