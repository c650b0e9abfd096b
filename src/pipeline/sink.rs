//! Output sink
//!
//! A single thread drains the output queue and writes each encoded
//! document followed by a newline, in arrival order. The writer is flushed
//! after every document so a file on disk is always a sequence of whole
//! documents. The sink exits once the output queue is closed (every worker
//! has dropped its sender) and drained.

use crate::error::WorkerError;
use crate::pipeline::queue::QueueReceiver;
use crate::pipeline::stats::PipelineStats;
use std::io::{self, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Handle to the sink thread
pub struct OutputSink {
    handle: Option<JoinHandle<io::Result<u64>>>,
}

impl OutputSink {
    /// Spawn the sink thread writing to `writer`
    pub fn spawn<W>(
        writer: W,
        outputs: QueueReceiver<String>,
        stats: Arc<PipelineStats>,
    ) -> Result<Self, WorkerError>
    where
        W: Write + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("sink".into())
            .spawn(move || {
                let mut writer = writer;
                let result = drain_to(outputs, &mut writer, &stats);
                if let Err(ref e) = result {
                    error!(error = %e, "Error writing output");
                }
                result
            })
            .map_err(|e| WorkerError::SpawnFailed {
                role: "sink",
                reason: e.to_string(),
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the sink to write everything, returning the document count
    pub fn finish(mut self) -> crate::Result<u64> {
        match self.handle.take() {
            Some(handle) => {
                let written = handle
                    .join()
                    .map_err(|_| WorkerError::ThreadPanicked { role: "sink" })??;
                debug!(written, "Sink finished");
                Ok(written)
            }
            None => Ok(0),
        }
    }
}

/// Write every queued document to `writer` until the queue closes
pub fn drain_to<W: Write>(
    outputs: QueueReceiver<String>,
    writer: &mut W,
    stats: &PipelineStats,
) -> io::Result<u64> {
    let mut written = 0u64;

    for text in outputs {
        writer.write_all(text.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        written += 1;
        stats.record_written(text.len() as u64 + 1);
    }

    Ok(written)
}
