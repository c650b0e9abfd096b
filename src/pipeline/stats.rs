//! Counters shared by the producer, the workers and the sink

use crate::error::JobOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Run-wide statistics
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Documents decoded by the producer
    pub decoded: AtomicU64,

    /// Documents whose target value was replaced
    pub hashed: AtomicU64,

    /// Documents emitted without substitution (empty value)
    pub passed_through: AtomicU64,

    /// Documents where the key path could not be followed
    pub path_errors: AtomicU64,

    /// Documents whose leaf was not a string
    pub leaf_skipped: AtomicU64,

    /// Documents dropped because they could not be encoded
    pub encode_errors: AtomicU64,

    /// Documents written by the sink
    pub written: AtomicU64,

    /// Bytes written by the sink, newlines included
    pub bytes_written: AtomicU64,
}

impl PipelineStats {
    pub(crate) fn record_decoded(&self) -> u64 {
        self.decoded.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_outcome(&self, outcome: &JobOutcome) {
        let counter = match outcome {
            JobOutcome::Hashed { .. } => &self.hashed,
            JobOutcome::PassedThrough { .. } => &self.passed_through,
            JobOutcome::PathMissed { .. } => &self.path_errors,
            JobOutcome::LeafSkipped { .. } => &self.leaf_skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_written(&self, bytes: u64) {
        self.written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Documents decoded so far
    pub fn decoded(&self) -> u64 {
        self.decoded.load(Ordering::Relaxed)
    }

    /// Documents hashed so far
    pub fn hashed(&self) -> u64 {
        self.hashed.load(Ordering::Relaxed)
    }

    /// Documents emitted without a substitution, for any reason
    pub fn unmodified(&self) -> u64 {
        self.passed_through.load(Ordering::Relaxed)
            + self.path_errors.load(Ordering::Relaxed)
            + self.leaf_skipped.load(Ordering::Relaxed)
    }

    /// Documents written so far
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Path errors so far
    pub fn path_errors(&self) -> u64 {
        self.path_errors.load(Ordering::Relaxed)
    }

    /// Documents that could not be encoded and were not written
    pub fn encode_errors(&self) -> u64 {
        self.encode_errors.load(Ordering::Relaxed)
    }
}
