//! A minimal scanner over raw Protobuf wire data.
//!
//! Custom method options which the descriptor types do not declare reach the
//! plugin as an opaque blob of wire-encoded fields. The scanner walks that
//! blob field by field, skipping every value it is not interested in, until
//! it finds the requested field.

use std::str;

use bytes::Buf;
use prost::encoding::{decode_key, decode_varint, WireType};
use prost::DecodeError;

/// Nesting limit for skipped groups, matching the `prost` decoder.
const RECURSION_LIMIT: u32 = 100;

/// Returns the first string value carried under `field_number` in `blob`.
///
/// Returns `None` when the field never appears, when it appears with a wire
/// type other than length-delimited, when its payload is not valid UTF-8, or
/// when the blob turns out to be malformed before the field is reached.
/// Only the first occurrence of the field is ever inspected.
pub fn extract_string(mut blob: &[u8], field_number: u32) -> Option<String> {
    while blob.has_remaining() {
        let (tag, wire_type) = decode_key(&mut blob).ok()?;
        if tag == field_number {
            if wire_type != WireType::LengthDelimited {
                return None;
            }
            return decode_str(&mut blob).ok().map(ToOwned::to_owned);
        }
        skip_value(tag, wire_type, &mut blob, RECURSION_LIMIT).ok()?;
    }
    None
}

/// Decodes a length-prefixed UTF-8 payload, advancing `buf` past it.
fn decode_str<'a>(buf: &mut &'a [u8]) -> Result<&'a str, DecodeError> {
    let len = decode_len(buf)?;
    let bytes: &'a [u8] = *buf;
    let (value, rest) = bytes.split_at(len);
    *buf = rest;
    str::from_utf8(value)
        .map_err(|_| DecodeError::new("invalid string value: data is not UTF-8 encoded"))
}

/// Decodes a length prefix and checks that the buffer holds that many bytes.
fn decode_len(buf: &mut impl Buf) -> Result<usize, DecodeError> {
    let len = decode_varint(buf)?;
    if len > buf.remaining() as u64 {
        return Err(DecodeError::new("buffer underflow"));
    }
    Ok(len as usize)
}

/// Advances `buf` past the value of a single field whose key has already
/// been consumed.
fn skip_value(
    tag: u32,
    wire_type: WireType,
    buf: &mut impl Buf,
    depth: u32,
) -> Result<(), DecodeError> {
    let len = match wire_type {
        WireType::Varint => decode_varint(buf).map(|_| 0)?,
        WireType::SixtyFourBit => 8,
        WireType::ThirtyTwoBit => 4,
        WireType::LengthDelimited => decode_len(buf)?,
        WireType::StartGroup => {
            if depth == 0 {
                return Err(DecodeError::new("recursion limit reached"));
            }
            loop {
                let (inner_tag, inner_wire_type) = decode_key(buf)?;
                if inner_wire_type == WireType::EndGroup {
                    if inner_tag != tag {
                        return Err(DecodeError::new("unexpected end group tag"));
                    }
                    break 0;
                }
                skip_value(inner_tag, inner_wire_type, buf, depth - 1)?;
            }
        }
        WireType::EndGroup => return Err(DecodeError::new("unexpected end group tag")),
    };

    if len > buf.remaining() {
        return Err(DecodeError::new("buffer underflow"));
    }
    buf.advance(len);
    Ok(())
}
