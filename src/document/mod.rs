//! JSON documents and key paths
//!
//! A [`Document`] is a top-level JSON object. Objects keep their key order
//! (`serde_json` is built with `preserve_order`), so rewriting one leaf
//! leaves every sibling where it was.
//!
//! Decoding is streaming: [`decode_stream`] yields one document at a time
//! from any reader holding whitespace separated JSON objects, so the input
//! is never held in memory as a whole. Nesting is not bounded by the call
//! stack: the decoder grows its stack on the heap as it descends, and
//! documents up to [`MAX_DEPTH`] levels deep are accepted.

pub mod path;

pub use path::{read, write, KeyPath};

use serde::Deserialize;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::io::{self, BufRead};

/// A decoded top-level JSON object
pub type Document = Map<String, Value>;

/// Deepest nesting accepted, counting the top-level object as one
pub const MAX_DEPTH: usize = 10_000;

/// Indent used for pretty output
const PRETTY_INDENT: &[u8] = b"    ";

/// How documents are written to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// One document per line
    #[default]
    Compact,
    /// Indented multi-line documents
    Pretty,
}

/// Decode a stream of concatenated JSON objects one at a time
///
/// The iterator ends cleanly at end of input. A malformed document, or one
/// nested deeper than [`MAX_DEPTH`], yields one `Err` item and ends the
/// stream. Error positions are relative to the start of that document.
pub fn decode_stream<R: BufRead>(reader: R) -> DocumentStream<R> {
    DocumentStream {
        reader,
        done: false,
    }
}

/// Iterator over the documents of a stream, see [`decode_stream`]
pub struct DocumentStream<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> DocumentStream<R> {
    fn decode_next(&mut self) -> serde_json::Result<Document> {
        let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
        de.disable_recursion_limit();
        let doc = Document::deserialize(serde_stacker::Deserializer::new(&mut de))?;

        let depth = nesting_depth(&doc);
        if depth > MAX_DEPTH {
            discard(doc);
            return Err(<serde_json::Error as serde::de::Error>::custom(format_args!(
                "document nested {} levels deep, limit is {}",
                depth, MAX_DEPTH
            )));
        }
        Ok(doc)
    }
}

impl<R: BufRead> Iterator for DocumentStream<R> {
    type Item = serde_json::Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = match skip_whitespace(&mut self.reader) {
            Ok(false) => {
                self.done = true;
                return None;
            }
            Ok(true) => self.decode_next(),
            Err(e) => Err(serde_json::Error::io(e)),
        };

        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Consume JSON whitespace, returning false at end of input
fn skip_whitespace<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(false);
        }

        let len = buf.len();
        let blank = buf
            .iter()
            .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
            .count();
        reader.consume(blank);
        if blank < len {
            return Ok(true);
        }
    }
}

/// Nesting depth of a document, walked without recursion
pub fn nesting_depth(doc: &Document) -> usize {
    let mut deepest = 1;
    let mut pending: Vec<(&Value, usize)> = doc.values().map(|v| (v, 2)).collect();

    while let Some((value, depth)) = pending.pop() {
        match value {
            Value::Array(items) => {
                deepest = deepest.max(depth);
                pending.extend(items.iter().map(|v| (v, depth + 1)));
            }
            Value::Object(map) => {
                deepest = deepest.max(depth);
                pending.extend(map.values().map(|v| (v, depth + 1)));
            }
            _ => {}
        }
    }

    deepest
}

/// Drop a document without recursing into it
fn discard(doc: Document) {
    let mut pending: Vec<Value> = doc.into_iter().map(|(_, v)| v).collect();
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

/// Encode a document in the requested style
pub fn encode(doc: &Document, style: OutputStyle) -> serde_json::Result<String> {
    match style {
        OutputStyle::Compact => serde_json::to_string(doc),
        OutputStyle::Pretty => {
            let mut buf = Vec::with_capacity(256);
            let mut ser =
                serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(PRETTY_INDENT));
            doc.serialize(&mut ser)?;
            String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
        }
    }
}

/// Name of a value's JSON type, for diagnostics
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
