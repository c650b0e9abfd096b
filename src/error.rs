//! Error types for json-salt
//!
//! This module defines the error hierarchy for:
//! - Configuration and resource acquisition (fatal)
//! - Key path navigation inside a single document (per-document)
//! - Leaf values that cannot be hashed (per-document)
//! - Worker thread failures
//!
//! Only configuration errors and worker failures abort a run. Path and leaf
//! errors are logged against the job that hit them and the document flows
//! through unmodified.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for json-salt
#[derive(Error, Debug)]
pub enum SaltError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Key path errors
    #[error("Key path error: {0}")]
    Path(#[from] PathError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors on the input or output stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and resource acquisition errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No key path given
    #[error("No target key to hash defined (use -k/--key)")]
    MissingKeyPath,

    /// Delimiter must be at least one character
    #[error("Key path delimiter must not be empty")]
    EmptyDelimiter,

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Invalid progress interval
    #[error("Invalid progress interval {interval}: must be at least 1")]
    InvalidProgressInterval { interval: u64 },

    /// Input file could not be opened
    #[error("Cannot open input file '{path}': {reason}")]
    InputUnreadable { path: PathBuf, reason: String },

    /// Output file could not be created
    #[error("Cannot create output file '{path}': {reason}")]
    OutputUncreatable { path: PathBuf, reason: String },

    /// Reading the salt from the terminal failed
    #[error("Failed to read salt: {0}")]
    SaltPrompt(String),
}

/// Why a key path could not be followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorKind {
    /// The key is absent at this level
    MissingKey,

    /// The value at this level is not an object
    NotAMap {
        /// JSON type actually found
        found: &'static str,
    },

    /// The key path has no segments
    EmptyPath,
}

impl fmt::Display for PathErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathErrorKind::MissingKey => f.write_str("key does not exist"),
            PathErrorKind::NotAMap { found } => write!(f, "expected object but found {}", found),
            PathErrorKind::EmptyPath => f.write_str("key path is empty"),
        }
    }
}

/// Failure to follow a key path inside one document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at segment '{segment}'")]
pub struct PathError {
    /// What went wrong
    pub kind: PathErrorKind,

    /// The segment being resolved when the walk failed
    pub segment: String,
}

impl PathError {
    pub(crate) fn missing_key(segment: &str) -> Self {
        Self {
            kind: PathErrorKind::MissingKey,
            segment: segment.to_string(),
        }
    }

    pub(crate) fn not_a_map(segment: &str, found: &'static str) -> Self {
        Self {
            kind: PathErrorKind::NotAMap { found },
            segment: segment.to_string(),
        }
    }

    pub(crate) fn empty_path() -> Self {
        Self {
            kind: PathErrorKind::EmptyPath,
            segment: String::new(),
        }
    }

    /// Returns true if the walk stopped on an absent key
    pub fn is_missing_key(&self) -> bool {
        matches!(self.kind, PathErrorKind::MissingKey)
    }

    /// Returns true if the walk stopped on a non-object value
    pub fn is_not_a_map(&self) -> bool {
        matches!(self.kind, PathErrorKind::NotAMap { .. })
    }
}

/// The leaf was found but cannot be hashed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeafError {
    /// Only string leaves are transformed and hashed
    #[error("leaf value is {found}, not a string")]
    NotAString { found: &'static str },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Producer or sink thread panicked
    #[error("{role} thread panicked")]
    ThreadPanicked { role: &'static str },

    /// Thread could not be started
    #[error("Failed to spawn {role} thread: {reason}")]
    SpawnFailed { role: &'static str, reason: String },

    /// Output queue closed while a worker still had documents to emit
    #[error("Worker {id}: output queue closed unexpectedly")]
    OutputClosed { id: usize },
}

/// Represents what happened to a single job
#[derive(Debug)]
pub enum JobOutcome {
    /// Leaf was hashed and written back
    Hashed { job: u64 },

    /// Document emitted without substitution (empty or absent value)
    PassedThrough { job: u64 },

    /// Key path could not be followed; document emitted unchanged
    PathMissed { job: u64, error: PathError },

    /// Leaf was not a string; document emitted unchanged
    LeafSkipped { job: u64, error: LeafError },
}

impl JobOutcome {
    /// Returns true if the target value was replaced
    pub fn is_hashed(&self) -> bool {
        matches!(self, JobOutcome::Hashed { .. })
    }

    /// Returns the job number associated with this outcome
    pub fn job(&self) -> u64 {
        match self {
            JobOutcome::Hashed { job }
            | JobOutcome::PassedThrough { job }
            | JobOutcome::PathMissed { job, .. }
            | JobOutcome::LeafSkipped { job, .. } => *job,
        }
    }
}

/// Result type alias for SaltError
pub type Result<T> = std::result::Result<T, SaltError>;

/// Result type alias for PathError
pub type PathResult<T> = std::result::Result<T, PathError>;
