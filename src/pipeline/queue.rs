//! Bounded queues with backpressure
//!
//! Both pipeline queues (jobs and encoded output) are crossbeam bounded
//! channels. A full queue blocks the sender, which is what keeps a fast
//! producer from outrunning a slow sink. A queue closes when its last
//! sender is dropped: receivers drain what is left and then see `None`.

use crate::document::Document;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One decoded document and its sequence number
#[derive(Debug, Clone)]
pub struct Job {
    /// 1-based position in the input stream
    pub id: u64,

    /// The document to transform
    pub doc: Document,
}

impl Job {
    /// Create a new job
    pub fn new(id: u64, doc: Document) -> Self {
        Self { id, doc }
    }
}

/// Statistics for a queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total items enqueued
    pub enqueued: AtomicU64,

    /// Total items dequeued
    pub dequeued: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (dequeued items)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Items sent but not yet received
    pub fn depth(&self) -> u64 {
        let enqueued = self.enqueued.load(Ordering::Relaxed);
        enqueued.saturating_sub(self.dequeued.load(Ordering::Relaxed))
    }
}

/// Create a bounded queue, returning its two ends
pub fn bounded_queue<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (sender, receiver) = bounded(capacity);
    let stats = Arc::new(QueueStats::default());

    (
        QueueSender {
            sender,
            stats: Arc::clone(&stats),
        },
        QueueReceiver {
            receiver,
            capacity,
            stats,
        },
    )
}

/// Sending end of a bounded queue
pub struct QueueSender<T> {
    sender: Sender<T>,
    stats: Arc<QueueStats>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<T> QueueSender<T> {
    /// Send an item, blocking while the queue is full
    ///
    /// Returns the item back if every receiver has been dropped.
    pub fn send(&self, item: T) -> Result<(), T> {
        self.sender.send(item).map_err(|e| e.into_inner())?;
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Receiving end of a bounded queue
pub struct QueueReceiver<T> {
    receiver: Receiver<T>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            capacity: self.capacity,
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<T> QueueReceiver<T> {
    /// Receive an item
    ///
    /// Blocks until an item is available. Returns `None` once the queue is
    /// empty and every sender has been dropped.
    pub fn recv(&self) -> Option<T> {
        let item = self.receiver.recv().ok()?;
        self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(item)
    }

    /// Receive with timeout
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let item = self.receiver.recv_timeout(timeout).ok()?;
        self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(item)
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Iterate until the queue is closed and drained
impl<T> Iterator for QueueReceiver<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}
