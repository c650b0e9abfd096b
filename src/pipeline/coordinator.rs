//! Run coordinator - wires the pipeline together
//!
//! The coordinator is responsible for:
//! - Opening the input and output (fatal on failure, before any thread starts)
//! - Creating the bounded job and output queues
//! - Spawning the producer, N workers and the sink
//! - Progress reporting while the workers run
//! - Joining everything and collecting final statistics
//!
//! Queues close by ownership: the producer owns the only job sender and
//! the workers own the only output senders, so the job queue closes at end
//! of input and the output queue closes once the last worker exits. The
//! sink is joined after the workers, so every document a worker emitted has
//! been written when `run` returns.

use crate::config::SaltConfig;
use crate::digest::DigestCache;
use crate::error::{ConfigError, Result, WorkerError};
use crate::pipeline::producer::Producer;
use crate::pipeline::queue::{bounded_queue, Job, QueueStats};
use crate::pipeline::sink::OutputSink;
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::worker::{DocumentHasher, Worker};
use crate::progress::ProgressReporter;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Documents decoded from the input
    pub decoded: u64,

    /// Documents whose target value was replaced
    pub hashed: u64,

    /// Documents emitted without a substitution
    pub passed_through: u64,

    /// Documents whose key path could not be followed
    pub path_errors: u64,

    /// Documents written to the output
    pub written: u64,

    /// Documents that could not be encoded and were not written
    pub encode_errors: u64,

    /// Bytes written to the output
    pub bytes_written: u64,

    /// Digest lookups answered from the cache
    pub cache_hits: u64,

    /// Digests actually computed
    pub digests_computed: u64,

    /// Decode error that stopped the input early, if any
    pub decode_error: Option<String>,

    /// Time taken for the run
    pub duration: Duration,

    /// Whether the whole input was consumed
    pub completed: bool,
}

/// Coordinates one run of the pipeline
pub struct RunCoordinator {
    /// Configuration
    config: Arc<SaltConfig>,

    /// Digest cache shared by all workers
    cache: Arc<DigestCache>,

    /// Counters shared by every thread
    stats: Arc<PipelineStats>,

    /// Optional live progress display
    progress: Option<ProgressReporter>,
}

impl RunCoordinator {
    /// Create a new run coordinator
    pub fn new(config: SaltConfig) -> Result<Self> {
        config.validate()?;

        if config.transform.has_case_conflict() {
            warn!("Both lowercase and uppercase requested; uppercase is applied last and wins");
        }

        let cache = Arc::new(DigestCache::new(config.salt.clone(), config.cache_mode));

        Ok(Self {
            config: Arc::new(config),
            cache,
            stats: Arc::new(PipelineStats::default()),
            progress: None,
        })
    }

    /// Display live progress while the run is in flight
    pub fn with_progress(mut self, reporter: ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// The digest cache used by this run
    pub fn cache(&self) -> Arc<DigestCache> {
        Arc::clone(&self.cache)
    }

    /// Run against the configured input file and output destination
    pub fn run(self) -> Result<RunResult> {
        let input = open_input(&self.config.input)?;
        let output = open_output(self.config.output.as_deref())?;
        self.run_streams(input, output)
    }

    /// Run against arbitrary streams
    pub fn run_streams<R, W>(self, input: R, output: W) -> Result<RunResult>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let start = Instant::now();
        let config = Arc::clone(&self.config);

        info!(
            input = %config.input.display(),
            output = %config.output_display(),
            key = %config.key_path,
            workers = config.worker_count,
            "Starting run"
        );

        let (job_tx, job_rx) = bounded_queue::<Job>(config.queue_size);
        let (out_tx, out_rx) = bounded_queue::<String>(config.queue_size);
        let job_stats = job_tx.stats();

        let sink = OutputSink::spawn(output, out_rx, Arc::clone(&self.stats))?;

        let hasher = Arc::new(DocumentHasher::from_config(&config, Arc::clone(&self.cache)));
        let mut workers = Vec::with_capacity(config.worker_count);
        for id in 0..config.worker_count {
            workers.push(Worker::spawn(
                id,
                Arc::clone(&hasher),
                config.output_style,
                job_rx.clone(),
                out_tx.clone(),
                Arc::clone(&self.stats),
            )?);
        }
        // Only the workers may keep these ends alive
        drop(job_rx);
        drop(out_tx);
        info!(count = workers.len(), "Workers spawned");

        let producer = Producer::spawn(
            input,
            job_tx,
            config.progress_interval,
            Arc::clone(&self.stats),
        )?;

        self.wait_for_workers(&workers, &job_stats, start);

        let mut worker_error: Option<WorkerError> = None;
        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                error!(worker = id, error = %e, "Worker failed");
                worker_error.get_or_insert(e);
            }
        }

        let producer_summary = producer.join()?;
        // An output failure explains any worker failure, so report it first
        sink.finish()?;
        if let Some(e) = worker_error {
            return Err(e.into());
        }

        let result = self.collect_result(producer_summary.decode_error, start.elapsed());

        if let Some(ref p) = self.progress {
            p.finish(if result.completed {
                "Run completed"
            } else {
                "Run stopped on a decode error"
            });
        }

        info!(
            decoded = result.decoded,
            hashed = result.hashed,
            written = result.written,
            path_errors = result.path_errors,
            encode_errors = result.encode_errors,
            duration_secs = result.duration.as_secs(),
            "Run completed"
        );

        Ok(result)
    }

    /// Block until every worker has exited, refreshing progress meanwhile
    fn wait_for_workers(&self, workers: &[Worker], job_stats: &QueueStats, start: Instant) {
        let check_interval = Duration::from_millis(100);

        while !workers.iter().all(Worker::is_finished) {
            if let Some(ref p) = self.progress {
                p.update(&self.snapshot(job_stats, start));
            }
            thread::sleep(check_interval);
        }
    }

    fn snapshot(&self, job_stats: &QueueStats, start: Instant) -> RunProgress {
        RunProgress {
            decoded: self.stats.decoded(),
            hashed: self.stats.hashed(),
            unmodified: self.stats.unmodified(),
            written: self.stats.written(),
            cache_hits: self.cache.hits(),
            queued_jobs: job_stats.depth(),
            workers: self.config.worker_count,
            elapsed: start.elapsed(),
        }
    }

    fn collect_result(&self, decode_error: Option<String>, duration: Duration) -> RunResult {
        let stats = &self.stats;
        RunResult {
            decoded: stats.decoded(),
            hashed: stats.hashed(),
            passed_through: stats.unmodified(),
            path_errors: stats.path_errors(),
            written: stats.written(),
            encode_errors: stats.encode_errors(),
            bytes_written: stats.bytes_written(),
            cache_hits: self.cache.hits(),
            digests_computed: self.cache.computations(),
            completed: decode_error.is_none(),
            decode_error,
            duration,
        }
    }
}

/// Open the input file for streaming
fn open_input(path: &Path) -> std::result::Result<File, ConfigError> {
    File::open(path).map_err(|e| ConfigError::InputUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Create (or truncate) the output file, or use standard output
fn open_output(path: Option<&Path>) -> std::result::Result<Box<dyn Write + Send>, ConfigError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| ConfigError::OutputUncreatable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct RunProgress {
    /// Documents decoded
    pub decoded: u64,

    /// Documents hashed
    pub hashed: u64,

    /// Documents emitted without a substitution
    pub unmodified: u64,

    /// Documents written
    pub written: u64,

    /// Digest cache hits
    pub cache_hits: u64,

    /// Jobs waiting for a worker
    pub queued_jobs: u64,

    /// Worker count
    pub workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl RunProgress {
    /// Calculate documents per second rate
    pub fn docs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.written as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::salted_digest;
    use crate::document::KeyPath;
    use std::sync::Mutex;

    /// Writer whose contents can be inspected after the sink thread is done
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes).unwrap().lines().map(str::to_string).collect()
        }
    }

    fn config(key: &str, workers: usize) -> SaltConfig {
        let mut config = SaltConfig::new("unused.json", KeyPath::parse(key, ".").unwrap(), "pepper");
        config.worker_count = workers;
        config.queue_size = 4;
        config
    }

    fn run(config: SaltConfig, input: &'static str) -> (RunResult, Vec<String>) {
        let out = SharedBuffer::default();
        let result = RunCoordinator::new(config)
            .unwrap()
            .run_streams(input.as_bytes(), out.clone())
            .unwrap();
        (result, out.lines())
    }

    #[test]
    fn test_run_streams_single_worker() {
        let input = "{\"id\":1,\"email\":\"a\"}\n{\"id\":2,\"email\":\"b\"}\n{\"id\":3}\n";
        let (result, lines) = run(config("email", 1), input);

        assert!(result.completed);
        assert_eq!(result.decoded, 3);
        assert_eq!(result.written, 3);
        assert_eq!(result.hashed, 2);
        assert_eq!(result.path_errors, 1);
        assert_eq!(result.encode_errors, 0);
        assert_eq!(result.decoded, result.written + result.encode_errors);
        assert_eq!(
            lines,
            vec![
                format!(r#"{{"id":1,"email":"{}"}}"#, salted_digest(b"pepper", "a")),
                format!(r#"{{"id":2,"email":"{}"}}"#, salted_digest(b"pepper", "b")),
                r#"{"id":3}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_run_streams_many_workers() {
        let input: String = (0..200)
            .map(|i| format!("{{\"n\":{},\"v\":\"value{}\"}}\n", i, i % 10))
            .collect();
        let input: &'static str = Box::leak(input.into_boxed_str());

        let (result, lines) = run(config("v", 8), input);

        assert_eq!(result.decoded, 200);
        assert_eq!(result.written, 200);
        assert_eq!(lines.len(), 200);
        assert_eq!(result.cache_hits + result.digests_computed, 200);
    }

    #[test]
    fn test_run_streams_decode_error() {
        let (result, lines) = run(config("a", 2), "{\"a\":\"x\"} {\"a\": oops} {\"a\":\"y\"}");

        assert!(!result.completed);
        assert!(result.decode_error.is_some());
        assert_eq!(result.decoded, 1);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_run_missing_input_is_fatal() {
        let coordinator = RunCoordinator::new(config("a", 1)).unwrap();
        let err = coordinator.run().unwrap_err();
        assert!(matches!(
            err,
            crate::SaltError::Config(ConfigError::InputUnreadable { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut c = config("a", 1);
        c.worker_count = 0;
        assert!(RunCoordinator::new(c).is_err());
    }

    #[test]
    fn test_run_progress_rates() {
        let progress = RunProgress {
            decoded: 1000,
            hashed: 900,
            unmodified: 100,
            written: 1000,
            cache_hits: 10,
            queued_jobs: 4,
            workers: 2,
            elapsed: Duration::from_secs(10),
        };

        assert!((progress.docs_per_second() - 100.0).abs() < 0.1);
    }
}
