//! Key path navigation
//!
//! A [`KeyPath`] is a non-empty list of object keys. [`read`] and [`write`]
//! walk every segment but the last through nested objects; the last
//! segment names the leaf. Array elements cannot be addressed: an array in
//! the middle of a path fails with `NotAMap` like any other non-object.

use crate::document::{value_kind, Document};
use crate::error::{ConfigError, PathError, PathResult};
use serde_json::Value;
use std::fmt;

/// Location of a leaf inside a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
    delimiter: String,
}

/// Delimiter used when none is given
pub const DEFAULT_DELIMITER: &str = ".";

impl KeyPath {
    /// Build a key path from explicit segments
    pub fn new<I, S>(segments: I) -> PathResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::empty_path());
        }
        Ok(Self {
            segments,
            delimiter: DEFAULT_DELIMITER.to_string(),
        })
    }

    /// Split a delimited key path string, e.g. `user.email`
    ///
    /// Empty segments are kept (`""` is a legal JSON key), only an empty
    /// string as a whole is rejected.
    pub fn parse(raw: &str, delimiter: &str) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::MissingKeyPath);
        }
        if delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        Ok(Self {
            segments: raw.split(delimiter).map(str::to_string).collect(),
            delimiter: delimiter.to_string(),
        })
    }

    /// All segments, root first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Delimiter the path was written with
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if there are no segments (never the case once built)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment
    pub fn leaf(&self) -> &str {
        self.split_leaf().0
    }

    fn split_leaf(&self) -> (&str, &[String]) {
        match self.segments.split_last() {
            Some((leaf, parents)) => (leaf.as_str(), parents),
            None => ("", &[]),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(self.delimiter.as_str()))
    }
}

/// Read the value at `path`
///
/// Fails with `MissingKey` if any segment, including the leaf, is absent,
/// and with `NotAMap` if an intermediate value is not an object.
pub fn read<'a>(doc: &'a Document, path: &KeyPath) -> PathResult<&'a Value> {
    if path.is_empty() {
        return Err(PathError::empty_path());
    }
    let (leaf, parents) = path.split_leaf();

    let mut current = doc;
    for segment in parents {
        let child = current
            .get(segment)
            .ok_or_else(|| PathError::missing_key(segment))?;
        current = match child {
            Value::Object(map) => map,
            other => return Err(PathError::not_a_map(segment, value_kind(other))),
        };
    }

    current.get(leaf).ok_or_else(|| PathError::missing_key(leaf))
}

/// Replace (or insert) the value at `path`, returning what was there
///
/// Every intermediate segment must exist and hold an object; nothing is
/// modified when the walk fails. The leaf keeps its position among its
/// siblings when it already existed. Each ancestor is reached through a
/// unique mutable borrow of its parent, so the root sees the new leaf as
/// soon as this returns.
pub fn write(doc: &mut Document, path: &KeyPath, value: Value) -> PathResult<Option<Value>> {
    if path.is_empty() {
        return Err(PathError::empty_path());
    }
    let (leaf, parents) = path.split_leaf();

    let mut current = doc;
    for segment in parents {
        let child = current
            .get_mut(segment)
            .ok_or_else(|| PathError::missing_key(segment))?;
        current = match child {
            Value::Object(map) => map,
            other => return Err(PathError::not_a_map(segment, value_kind(other))),
        };
    }

    Ok(current.insert(leaf.to_string(), value))
}
