//! Line framing for record streams shaped like
//!
//! ```text
//! {"total_rows":3,"rows":[
//! {"id":"1","doc":{...}},
//! {"id":"2","doc":{...}},
//! {"id":"3","doc":{...}}]}
//! ```
//!
//! or with the closing `]}` on a line of its own. One record per line, the first line is a
//! header and a line starting with `]}` ends the stream.

use serde_json::Value;

/// What a physical line is, before ownership is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Header,
    Terminator,
    Record,
}

impl Line {
    pub fn kind(ordinal: usize, raw: &[u8]) -> Line {
        if ordinal == 0 {
            Line::Header
        } else if raw.starts_with(b"]}") {
            Line::Terminator
        } else {
            Line::Record
        }
    }
}

/// Strips the array punctuation around one record line.
pub fn record_body(raw: &[u8]) -> &[u8] {
    let line = raw.trim_ascii();
    if line.ends_with(b"}]}") {
        // last record, closing the array on the same line
        &line[..line.len() - 2]
    } else if line.ends_with(b"}") {
        line
    } else {
        line.split_last().map_or(line, |(_, rest)| rest)
    }
}

/// Decodes a trimmed record and pulls out its point.
pub fn decode(body: &[u8]) -> serde_json::Result<Option<(f64, f64)>> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(coordinates(&value))
}

/// Reads `doc.coordinates.coordinates` as `(x, y)`.
///
/// The raw pair is stored latitude first, so `x` is the second element and `y` the first.
/// Grid bounds are expressed in the same swapped axes.
pub fn coordinates(record: &Value) -> Option<(f64, f64)> {
    let pair = record.get("doc")?.get("coordinates")?.get("coordinates")?;
    match pair.as_array()?.as_slice() {
        [first, second, ..] => Some((second.as_f64()?, first.as_f64()?)),
        _ => None,
    }
}
