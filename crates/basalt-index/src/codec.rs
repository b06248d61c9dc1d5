//! Order-preserving key encoding for index entries.
//!
//! An entry key is the index id (8 bytes big-endian) followed by the
//! concatenated encodings of the tuple values. Byte-lexicographic
//! comparison of encoded keys equals the type-aware value order
//!
//! `undefined < null < boolean < number < string < array < object`
//!
//! (with objectid and datetime as trailing classes), and within each
//! class the natural order of the type. The encoding is also
//! prefix-consistent: the encoding of a short tuple is a byte prefix of
//! the encoding of every tuple extending it, which is what lets partial
//! tuples act as scan endpoints.

use bson::Bson;

use crate::error::IndexError;

const TAG_UNDEFINED: u8 = 0x02;
const TAG_NULL: u8 = 0x03;
const TAG_BOOLEAN: u8 = 0x04;
const TAG_NUMBER: u8 = 0x05;
const TAG_STRING: u8 = 0x06;
const TAG_ARRAY: u8 = 0x07;
const TAG_OBJECT: u8 = 0x08;
const TAG_OBJECT_ID: u8 = 0x09;
const TAG_DATETIME: u8 = 0x0A;

const TERMINATOR: u8 = 0x00;
const ESCAPE: u8 = 0xFF;

// Sortable numeric transforms: flip the sign bit (positive) or all bits
// (negative) and store big-endian, so byte order equals numeric order.

#[inline]
fn encode_f64_sortable(f: f64) -> [u8; 8] {
    // collapse -0.0 so both zeroes produce the same key
    let f = if f == 0.0 { 0.0 } else { f };
    let bits = f.to_bits();
    let encoded = if bits & 0x8000_0000_0000_0000 != 0 {
        !bits
    } else {
        bits ^ 0x8000_0000_0000_0000
    };
    encoded.to_be_bytes()
}

#[inline]
fn encode_i64_sortable(n: i64) -> [u8; 8] {
    ((n as u64) ^ 0x8000_0000_0000_0000).to_be_bytes()
}

/// Append `bytes` with embedded zero bytes escaped as `0x00 0xFF`, then
/// the `0x00` terminator. A string that is a prefix of another compares
/// below it, and no content byte sequence collides with the terminator.
fn push_terminated(buf: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        buf.push(b);
        if b == TERMINATOR {
            buf.push(ESCAPE);
        }
    }
    buf.push(TERMINATOR);
}

/// Append the order-preserving encoding of one value.
///
/// `Bson::Undefined` is the missing-attribute sentinel and sorts below
/// everything else. Types with no place in the key order (binary, regex,
/// decimal128, ...) are rejected.
pub fn encode_value(buf: &mut Vec<u8>, value: &Bson) -> Result<(), IndexError> {
    match value {
        Bson::Undefined => buf.push(TAG_UNDEFINED),
        Bson::Null => buf.push(TAG_NULL),
        Bson::Boolean(b) => {
            buf.push(TAG_BOOLEAN);
            buf.push(*b as u8);
        }
        Bson::Int32(n) => {
            buf.push(TAG_NUMBER);
            buf.extend_from_slice(&encode_f64_sortable(f64::from(*n)));
        }
        Bson::Int64(n) => {
            buf.push(TAG_NUMBER);
            buf.extend_from_slice(&encode_f64_sortable(*n as f64));
        }
        Bson::Double(f) => {
            buf.push(TAG_NUMBER);
            buf.extend_from_slice(&encode_f64_sortable(*f));
        }
        Bson::String(s) => {
            buf.push(TAG_STRING);
            push_terminated(buf, s.as_bytes());
        }
        Bson::Array(items) => {
            buf.push(TAG_ARRAY);
            for item in items {
                encode_value(buf, item)?;
            }
            buf.push(TERMINATOR);
        }
        Bson::Document(doc) => {
            buf.push(TAG_OBJECT);
            let mut entries: Vec<_> = doc.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, val) in entries {
                push_terminated(buf, key.as_bytes());
                encode_value(buf, val)?;
            }
            buf.push(TERMINATOR);
        }
        Bson::ObjectId(oid) => {
            buf.push(TAG_OBJECT_ID);
            buf.extend_from_slice(&oid.bytes());
        }
        Bson::DateTime(dt) => {
            buf.push(TAG_DATETIME);
            buf.extend_from_slice(&encode_i64_sortable(dt.timestamp_millis()));
        }
        other => {
            return Err(IndexError::Encoding(format!(
                "type {:?} cannot appear in an index key",
                other.element_type()
            )));
        }
    }
    Ok(())
}

/// Encode a single value to its own byte string. This is also the stored
/// form of a document's primary key.
pub fn value_bytes(value: &Bson) -> Result<Vec<u8>, IndexError> {
    let mut buf = Vec::new();
    encode_value(&mut buf, value)?;
    Ok(buf)
}

/// Encode a full or partial entry key for `index_id` over `values`.
pub fn entry_key(index_id: u64, values: &[Bson]) -> Result<Vec<u8>, IndexError> {
    let mut buf = Vec::with_capacity(8 + values.len() * 12);
    buf.extend_from_slice(&index_id.to_be_bytes());
    for value in values {
        encode_value(&mut buf, value)?;
    }
    Ok(buf)
}

/// The least byte string strictly greater than every string that has
/// `prefix` as a prefix; `None` when no such string exists.
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let end = prefix.iter().rposition(|&b| b != 0xFF)?;
    let mut out = prefix[..=end].to_vec();
    out[end] += 1;
    Some(out)
}
