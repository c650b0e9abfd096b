//! Configuration types for json-salt
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - The validated, immutable run configuration shared by every component

use crate::digest::CacheMode;
use crate::document::{KeyPath, OutputStyle};
use crate::error::ConfigError;
use crate::transform::ValueTransform;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 1;

/// Default capacity of the job and output queues
pub const DEFAULT_QUEUE_SIZE: usize = 1000;

/// Default number of documents between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Replace a value in a stream of JSON documents with its salted hash
#[derive(clap::Parser, Debug, Clone)]
#[command(
    name = "json-salt",
    version,
    about = "Replace a value in a stream of JSON documents with its salted hash",
    long_about = "Streams concatenated JSON documents from a file, finds the value at a nested \
                  key path in each one and replaces it with md5(salt + value).\n\n\
                  Repeated values are hashed once and cached unless --brute-force is given. \
                  Output order is not preserved when more than one worker is used.",
    after_help = "EXAMPLES:\n    \
        json-salt -f users.json -k user.email -s pepper --lc --ws\n    \
        json-salt -f users.json -o hashed.json -k user/email -d / -w 8\n    \
        JSON_SALT=pepper json-salt -f users.json -k email -p"
)]
pub struct CliArgs {
    /// Path to the input JSON file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub input: PathBuf,

    /// Path to the output file (standard output if not set)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<String>,

    /// Key path of the value to hash, nested keys separated by the delimiter
    #[arg(short = 'k', long = "key", value_name = "PATH")]
    pub key: String,

    /// Delimiter between nested key names
    #[arg(short = 'd', long, default_value = ".", value_name = "DELIM")]
    pub delimiter: String,

    /// Salt to hash the value with (prompted for when not given or empty)
    #[arg(short = 's', long, env = "JSON_SALT", hide_env_values = true, value_name = "SALT")]
    pub salt: Option<String>,

    /// Number of concurrent workers
    #[arg(short = 'w', long, default_value = "1", value_name = "NUM")]
    pub workers: usize,

    /// Convert the value to lowercase before hashing
    #[arg(long = "lc", visible_alias = "lowercase")]
    pub lowercase: bool,

    /// Convert the value to uppercase before hashing
    #[arg(long = "uc", visible_alias = "uppercase")]
    pub uppercase: bool,

    /// Strip leading and trailing whitespace before hashing
    #[arg(long = "ws", visible_alias = "trim")]
    pub trim: bool,

    /// Hash every value without caching digests
    #[arg(short = 'b', long)]
    pub brute_force: bool,

    /// Pretty print documents instead of JSON lines
    #[arg(short = 'p', long)]
    pub pretty: bool,

    /// Capacity of the job and output queues (controls memory usage)
    #[arg(long, default_value_t = DEFAULT_QUEUE_SIZE, value_name = "NUM")]
    pub queue_size: usize,

    /// Log the decoded document count every NUM documents
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL, value_name = "NUM")]
    pub progress_interval: u64,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct SaltConfig {
    /// Input file
    pub input: PathBuf,

    /// Output file, `None` for standard output
    pub output: Option<PathBuf>,

    /// Location of the value to hash
    pub key_path: KeyPath,

    /// Salt bytes prepended to every value
    pub salt: Vec<u8>,

    /// Normalization applied before hashing
    pub transform: ValueTransform,

    /// Cache digests or recompute every time
    pub cache_mode: CacheMode,

    /// Compact or pretty output
    pub output_style: OutputStyle,

    /// Number of worker threads
    pub worker_count: usize,

    /// Capacity of each bounded queue
    pub queue_size: usize,

    /// Documents between progress reports
    pub progress_interval: u64,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl SaltConfig {
    /// Configuration with defaults for everything but the essentials
    pub fn new(input: impl Into<PathBuf>, key_path: KeyPath, salt: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            output: None,
            key_path,
            salt: salt.into(),
            transform: ValueTransform::default(),
            cache_mode: CacheMode::Cached,
            output_style: OutputStyle::Compact,
            worker_count: 1,
            queue_size: DEFAULT_QUEUE_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            show_progress: false,
            verbose: false,
        }
    }

    /// Create and validate configuration from CLI arguments
    ///
    /// An absent or empty `--salt` leaves the salt empty; call
    /// [`SaltConfig::resolve_salt`] afterwards to ask for one.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let key_path = KeyPath::parse(&args.key, &args.delimiter)?;
        let salt = args.salt.map(String::into_bytes).unwrap_or_default();

        let config = Self {
            input: args.input,
            output: args.output.filter(|p| !p.is_empty()).map(PathBuf::from),
            key_path,
            salt,
            transform: ValueTransform {
                trim: args.trim,
                lowercase: args.lowercase,
                uppercase: args.uppercase,
            },
            cache_mode: if args.brute_force {
                CacheMode::BruteForce
            } else {
                CacheMode::Cached
            },
            output_style: if args.pretty {
                OutputStyle::Pretty
            } else {
                OutputStyle::Compact
            },
            worker_count: args.workers,
            queue_size: args.queue_size,
            progress_interval: args.progress_interval,
            show_progress: !args.quiet,
            verbose: args.verbose,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check numeric limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }

        if self.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: self.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        if self.progress_interval == 0 {
            return Err(ConfigError::InvalidProgressInterval {
                interval: self.progress_interval,
            });
        }

        Ok(())
    }

    /// Returns true if a non-empty salt is set
    pub fn has_salt(&self) -> bool {
        !self.salt.is_empty()
    }

    /// Fill in the salt from `prompt` when none was supplied
    pub fn resolve_salt<F>(&mut self, prompt: F) -> Result<(), ConfigError>
    where
        F: FnOnce() -> Result<String, ConfigError>,
    {
        if !self.has_salt() {
            self.salt = prompt()?.into_bytes();
        }
        Ok(())
    }

    /// Human readable output destination
    pub fn output_display(&self) -> String {
        match &self.output {
            Some(path) => path.display().to_string(),
            None => "<stdout>".to_string(),
        }
    }
}
