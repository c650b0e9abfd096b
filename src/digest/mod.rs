//! Salted digests and the shared digest cache
//!
//! This module provides functions for:
//! - Computing the salted MD5 digest of a transformed value
//! - Sharing digests across workers so repeated values are hashed once

pub mod cache;
pub mod checksum;

pub use cache::{CacheMode, DigestCache};
pub use checksum::salted_digest;
