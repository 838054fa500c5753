//! Line-delimited JSON decoding for benchmark harness output
//!
//! Benchmark logs are captured by redirecting the harness's stdout, so on
//! Windows runners they usually arrive as UTF-16 with a byte-order mark and
//! interleaved with plain console text. Only lines that start with `{` are
//! treated as records; a malformed record aborts the whole load.

use crate::error::GateError;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Text encoding detected from the leading byte-order mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Detect the encoding and return the number of BOM bytes to skip
    pub fn detect(bytes: &[u8]) -> (Self, usize) {
        match bytes {
            [0xFF, 0xFE, ..] => (TextEncoding::Utf16Le, 2),
            [0xFE, 0xFF, ..] => (TextEncoding::Utf16Be, 2),
            [0xEF, 0xBB, 0xBF, ..] => (TextEncoding::Utf8, 3),
            _ => (TextEncoding::Utf8, 0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
        }
    }
}

/// One parsed benchmark trial
///
/// Fields are kept as raw JSON so heterogeneous logs (AM and Cluster
/// records side by side) can be told apart by field presence.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    line: usize,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(line: usize, fields: Map<String, Value>) -> Self {
        Self { line, fields }
    }

    /// 1-based line number in the source file
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Decode raw bytes into text, honouring a UTF-16/UTF-8 byte-order mark
///
/// Decoding is strict: any invalid sequence fails the whole input.
pub fn decode_text(bytes: &[u8], path: &Path) -> Result<String, GateError> {
    let (encoding, bom_len) = TextEncoding::detect(bytes);
    let body = &bytes[bom_len..];
    let decode_error = || GateError::Decode {
        path: path.to_path_buf(),
        encoding: encoding.label(),
    };

    match encoding {
        TextEncoding::Utf8 => String::from_utf8(body.to_vec()).map_err(|_| decode_error()),
        TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
            if body.len() % 2 != 0 {
                return Err(decode_error());
            }
            let units = body.chunks_exact(2).map(|pair| {
                let pair = [pair[0], pair[1]];
                if encoding == TextEncoding::Utf16Le {
                    u16::from_le_bytes(pair)
                } else {
                    u16::from_be_bytes(pair)
                }
            });
            char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .map_err(|_| decode_error())
        }
    }
}

/// Parse decoded text into records
///
/// Blank lines and lines not starting with `{` are skipped. The first line
/// that looks like a record but does not parse as a JSON object is fatal.
pub fn parse_records(text: &str, path: &Path) -> Result<Vec<Record>, GateError> {
    let mut records = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || !line.starts_with('{') {
            continue;
        }

        let fields: Map<String, Value> =
            serde_json::from_str(line).map_err(|source| GateError::MalformedLine {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
        records.push(Record::new(idx + 1, fields));
    }

    Ok(records)
}

/// Read and parse a benchmark log from disk
pub fn load_records(path: &Path) -> Result<Vec<Record>, GateError> {
    let bytes = fs::read(path).map_err(|e| GateError::io(path, e))?;
    let text = decode_text(&bytes, path)?;
    let records = parse_records(&text, path)?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded benchmark log");
    Ok(records)
}
