//! Worker thread logic for hashing documents
//!
//! Each worker:
//! - Pulls jobs from the shared job queue until it is closed
//! - Reads the value at the key path and normalizes it
//! - Replaces it with its salted digest via the shared cache
//! - Encodes the document and pushes it to the output queue
//!
//! Workers hold no state between jobs apart from the digest cache. A
//! document whose key path cannot be followed, or whose value is empty or
//! not a string, is still emitted, unmodified.

use crate::config::SaltConfig;
use crate::digest::DigestCache;
use crate::document::{self, value_kind, Document, KeyPath, OutputStyle};
use crate::error::{JobOutcome, LeafError, WorkerError};
use crate::pipeline::queue::{Job, QueueReceiver, QueueSender};
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::DOCUMENT_STACK_SIZE;
use crate::transform::ValueTransform;
use serde_json::Value;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

/// Applies the configured key path, transforms and digest to documents
#[derive(Debug)]
pub struct DocumentHasher {
    key_path: KeyPath,
    transform: ValueTransform,
    cache: Arc<DigestCache>,
}

impl DocumentHasher {
    /// Create a hasher from explicit parts
    pub fn new(key_path: KeyPath, transform: ValueTransform, cache: Arc<DigestCache>) -> Self {
        Self {
            key_path,
            transform,
            cache,
        }
    }

    /// Create a hasher for a run configuration
    pub fn from_config(config: &SaltConfig, cache: Arc<DigestCache>) -> Self {
        Self::new(config.key_path.clone(), config.transform, cache)
    }

    /// Replace the target value of one document with its digest
    pub fn hash_document(&self, job: u64, doc: &mut Document) -> JobOutcome {
        let value = match document::read(doc, &self.key_path) {
            Ok(Value::String(s)) => self.transform.apply(s).into_owned(),
            Ok(other) => {
                return JobOutcome::LeafSkipped {
                    job,
                    error: LeafError::NotAString {
                        found: value_kind(other),
                    },
                }
            }
            Err(error) => return JobOutcome::PathMissed { job, error },
        };

        if value.is_empty() {
            return JobOutcome::PassedThrough { job };
        }

        let digest = self.cache.get_or_compute(&value);
        match document::write(doc, &self.key_path, Value::String(digest)) {
            Ok(_) => JobOutcome::Hashed { job },
            Err(error) => JobOutcome::PathMissed { job, error },
        }
    }

    /// The key path being hashed
    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }
}

/// A worker thread that processes jobs
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<Result<(), WorkerError>>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        hasher: Arc<DocumentHasher>,
        style: OutputStyle,
        jobs: QueueReceiver<Job>,
        output: QueueSender<String>,
        stats: Arc<PipelineStats>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("worker-{}", id))
            .stack_size(DOCUMENT_STACK_SIZE)
            .spawn(move || worker_loop(id, &hasher, style, jobs, output, &stats))
            .map_err(|e| WorkerError::SpawnFailed {
                role: "worker",
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns true once the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(result) => result,
                Err(_) => Err(WorkerError::Panicked {
                    id: self.id,
                    message: "Worker thread panicked".into(),
                }),
            }
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
fn worker_loop(
    id: usize,
    hasher: &DocumentHasher,
    style: OutputStyle,
    jobs: QueueReceiver<Job>,
    output: QueueSender<String>,
    stats: &PipelineStats,
) -> Result<(), WorkerError> {
    debug!(worker = id, "Worker starting");

    while let Some(Job { id: job, mut doc }) = jobs.recv() {
        let outcome = hasher.hash_document(job, &mut doc);
        stats.record_outcome(&outcome);

        match &outcome {
            JobOutcome::Hashed { .. } | JobOutcome::PassedThrough { .. } => {}
            JobOutcome::PathMissed { error, .. } => {
                warn!(
                    worker = id,
                    job,
                    key = %hasher.key_path(),
                    error = %error,
                    "Failed to get value"
                );
            }
            JobOutcome::LeafSkipped { error, .. } => {
                warn!(worker = id, job, key = %hasher.key_path(), error = %error, "Value not hashed");
            }
        }

        let text = match document::encode(&doc, style) {
            Ok(text) => text,
            Err(e) => {
                stats.record_encode_error();
                error!(worker = id, job, error = %e, "Failed to encode document");
                continue;
            }
        };

        if output.send(text).is_err() {
            error!(worker = id, job, "Output queue closed");
            return Err(WorkerError::OutputClosed { id });
        }
        trace!(worker = id, job, "Document emitted");
    }

    debug!(worker = id, "Worker shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{salted_digest, CacheMode};
    use crate::pipeline::queue::bounded_queue;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn hasher(path: &str, transform: ValueTransform) -> DocumentHasher {
        DocumentHasher::new(
            KeyPath::parse(path, ".").unwrap(),
            transform,
            Arc::new(DigestCache::new("pepper", CacheMode::Cached)),
        )
    }

    #[test]
    fn test_hash_document_with_transforms() {
        let h = hasher(
            "user.email",
            ValueTransform {
                trim: true,
                lowercase: true,
                uppercase: false,
            },
        );
        let mut d = doc(json!({"user": {"email": "Foo@Bar.com ", "id": 1}}));

        let outcome = h.hash_document(1, &mut d);

        assert!(outcome.is_hashed());
        let expected = salted_digest(b"pepper", "foo@bar.com");
        assert_eq!(d, doc(json!({"user": {"email": expected, "id": 1}})));
    }

    #[test]
    fn test_hash_document_path_miss() {
        let h = hasher("a.c", ValueTransform::default());
        let mut d = doc(json!({"a": {"b": 1}}));

        let outcome = h.hash_document(5, &mut d);

        match outcome {
            JobOutcome::PathMissed { job, error } => {
                assert_eq!(job, 5);
                assert!(error.is_missing_key());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(d, doc(json!({"a": {"b": 1}})));
    }

    #[test]
    fn test_hash_document_empty_value_passes_through() {
        let h = hasher(
            "name",
            ValueTransform {
                trim: true,
                ..Default::default()
            },
        );
        let mut d = doc(json!({"name": "   "}));

        assert!(matches!(h.hash_document(1, &mut d), JobOutcome::PassedThrough { .. }));
        assert_eq!(d, doc(json!({"name": "   "})));
    }

    #[test]
    fn test_hash_document_non_string_leaf() {
        let h = hasher("n", ValueTransform::default());
        let mut d = doc(json!({"n": 42}));

        let outcome = h.hash_document(1, &mut d);
        assert!(matches!(
            outcome,
            JobOutcome::LeafSkipped {
                error: LeafError::NotAString { found: "number" },
                ..
            }
        ));
        assert_eq!(d, doc(json!({"n": 42})));
    }

    #[test]
    fn test_worker_drains_queue() {
        let (job_tx, job_rx) = bounded_queue(10);
        let (out_tx, out_rx) = bounded_queue(10);
        let stats = Arc::new(PipelineStats::default());
        let h = Arc::new(hasher("k", ValueTransform::default()));

        let worker = Worker::spawn(0, h, OutputStyle::Compact, job_rx, out_tx, Arc::clone(&stats)).unwrap();

        job_tx.send(Job::new(1, doc(json!({"k": "v"})))).unwrap();
        job_tx.send(Job::new(2, doc(json!({"other": "v"})))).unwrap();
        drop(job_tx);

        worker.join().unwrap();
        let out: Vec<String> = out_rx.collect();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], format!(r#"{{"k":"{}"}}"#, salted_digest(b"pepper", "v")));
        assert_eq!(out[1], r#"{"other":"v"}"#);
        assert_eq!(stats.hashed(), 1);
        assert_eq!(stats.path_errors(), 1);
    }

    #[test]
    fn test_worker_fails_when_output_closed() {
        let (job_tx, job_rx) = bounded_queue(10);
        let (out_tx, out_rx) = bounded_queue::<String>(10);
        drop(out_rx);
        let stats = Arc::new(PipelineStats::default());
        let h = Arc::new(hasher("k", ValueTransform::default()));

        let worker = Worker::spawn(3, h, OutputStyle::Compact, job_rx, out_tx, stats).unwrap();
        job_tx.send(Job::new(1, doc(json!({"k": "v"})))).unwrap();
        drop(job_tx);

        assert!(matches!(worker.join(), Err(WorkerError::OutputClosed { id: 3 })));
    }
}
