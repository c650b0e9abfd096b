//! Producer / worker / sink pipeline
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │        Producer         │
//!                     │  - streaming decoder    │
//!                     │  - numbers each doc     │
//!                     └───────────┬─────────────┘
//!                                 │ job queue (bounded)
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  navigate │             │  navigate │             │  navigate │
//! │  digest   │◄──────────► │  digest   │◄──────────► │  digest   │
//! └─────┬─────┘   shared    └─────┬─────┘   cache     └─────┬─────┘
//!       │                         │                         │
//!       └─────────────────────────┼─────────────────────────┘
//!                                 │ output queue (bounded)
//!                     ┌───────────▼─────────────┐
//!                     │          Sink           │
//!                     │  - one doc per line     │
//!                     └─────────────────────────┘
//! ```

/// Stack for threads that encode or drop whole documents; serializing a
/// document recurses once per nesting level, up to `MAX_DEPTH`
pub(crate) const DOCUMENT_STACK_SIZE: usize = 64 * 1024 * 1024;

pub mod coordinator;
pub mod producer;
pub mod queue;
pub mod sink;
pub mod stats;
pub mod worker;

pub use coordinator::{RunCoordinator, RunProgress, RunResult};
pub use producer::{Producer, ProducerSummary};
pub use queue::{bounded_queue, Job, QueueReceiver, QueueSender, QueueStats};
pub use sink::OutputSink;
pub use stats::PipelineStats;
pub use worker::{DocumentHasher, Worker};
