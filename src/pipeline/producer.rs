//! Producer: decodes the input stream into jobs
//!
//! A single thread reads the input through a buffered reader, decodes one
//! document at a time and pushes it onto the job queue with an increasing
//! sequence number. It stops at end of input, on the first malformed
//! document, or when no worker is left to receive jobs. Jobs already queued
//! are unaffected by any of these. Dropping the job sender when it returns
//! is what closes the job queue.

use crate::document::decode_stream;
use crate::error::WorkerError;
use crate::pipeline::queue::{Job, QueueSender};
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::DOCUMENT_STACK_SIZE;
use std::io::{BufReader, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// What the producer did before it stopped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerSummary {
    /// Documents decoded and queued
    pub decoded: u64,

    /// Decode error that ended the stream early, if any
    pub decode_error: Option<String>,
}

impl ProducerSummary {
    /// Returns true if the whole input was consumed
    pub fn reached_end(&self) -> bool {
        self.decode_error.is_none()
    }
}

/// Handle to the producer thread
pub struct Producer {
    handle: Option<JoinHandle<ProducerSummary>>,
}

impl Producer {
    /// Spawn the producer thread
    pub fn spawn<R>(
        input: R,
        jobs: QueueSender<Job>,
        progress_interval: u64,
        stats: Arc<PipelineStats>,
    ) -> Result<Self, WorkerError>
    where
        R: Read + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("producer".into())
            .stack_size(DOCUMENT_STACK_SIZE)
            .spawn(move || produce(input, jobs, progress_interval, &stats))
            .map_err(|e| WorkerError::SpawnFailed {
                role: "producer",
                reason: e.to_string(),
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the producer to finish
    pub fn join(mut self) -> Result<ProducerSummary, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WorkerError::ThreadPanicked { role: "producer" }),
            None => Ok(ProducerSummary::default()),
        }
    }
}

/// Decode `input` into jobs until it ends or fails
pub fn produce<R: Read>(
    input: R,
    jobs: QueueSender<Job>,
    progress_interval: u64,
    stats: &PipelineStats,
) -> ProducerSummary {
    let mut summary = ProducerSummary::default();
    let interval = progress_interval.max(1);

    for decoded in decode_stream(BufReader::new(input)) {
        let doc = match decoded {
            Ok(doc) => doc,
            Err(e) => {
                error!(after = summary.decoded, error = %e, "Error decoding JSON");
                summary.decode_error = Some(e.to_string());
                break;
            }
        };

        let id = summary.decoded + 1;
        if jobs.send(Job::new(id, doc)).is_err() {
            error!(job = id, "Job queue closed, no workers left");
            break;
        }
        summary.decoded = id;
        stats.record_decoded();

        if id % interval == 0 {
            info!(docs = id, "Total JSON docs");
        }
    }

    info!(docs = summary.decoded, "Total JSON docs");
    debug!("Producer finished");
    summary
}
