//! json-salt - Salted Hashing for Streams of JSON Documents
//!
//! Reads a file of concatenated JSON documents, locates the value at a
//! nested key path in each one and replaces it with the hex MD5 digest of
//! `salt + value`. Everything else in the document is left as it was, key
//! order included.
//!
//! # Features
//!
//! - **Streaming**: documents are decoded one at a time, so memory use is
//!   bounded by the queue capacity rather than the input size.
//!
//! - **Parallel Hashing**: any number of worker threads share one digest
//!   cache, so each distinct value is hashed once per run.
//!
//! - **Normalization**: optional trimming and case folding before hashing,
//!   so `" Foo@Bar.com"` and `"foo@bar.com"` map to the same digest.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Input file                               │
//! │              (concatenated JSON objects)                         │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//!            ┌──────────────────────────────────────┐
//!            │             Producer                 │
//!            │  - serde_json StreamDeserializer     │
//!            └──────────────────┬───────────────────┘
//!                               │ Job queue (crossbeam bounded)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Worker Threads                              │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐     │
//! │  │Worker 1 │  │Worker 2 │  │Worker 3 │  ...    │Worker N │     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘     │
//! │       └────────────┴─────┬──────┴────────────────────┘          │
//! │                          ▼                                      │
//! │            ┌──────────────────────────┐                         │
//! │            │      Digest Cache        │                         │
//! │            │  (DashMap, first wins)   │                         │
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ Output queue (crossbeam bounded)
//!                               ▼
//!                    ┌──────────────────┐
//!                    │   Sink thread    │
//!                    │  file or stdout  │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Hash user.email after trimming and lowercasing
//! json-salt -f users.json -k user.email -s pepper --ws --lc > hashed.json
//!
//! # Eight workers, custom delimiter, salt from the environment
//! JSON_SALT=pepper json-salt -f users.json -o hashed.json -k user/email -d / -w 8
//! ```

pub mod config;
pub mod digest;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod transform;

pub use config::{CliArgs, SaltConfig};
pub use digest::{salted_digest, CacheMode, DigestCache};
pub use document::{Document, KeyPath, OutputStyle};
pub use error::{ConfigError, Result, SaltError};
pub use pipeline::{RunCoordinator, RunResult};
pub use transform::ValueTransform;
