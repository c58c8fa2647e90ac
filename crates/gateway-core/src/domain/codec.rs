//! # Canonical Batch Encoder
//!
//! Deterministically serializes an ordered sequence of sub-messages into the
//! byte string the authorization digest is computed over.
//!
//! ## Wire layout
//!
//! Length-prefixed binary rather than canonical JSON, so there is nothing to
//! normalize; determinism falls out of the construction:
//!
//! ```text
//! batch    := count:u32_be message*
//! message  := 0x01 code_id:u64_be label payload     (instantiate)
//!           | 0x02 contract:20B payload             (execute)
//!           | 0x03 contract:20B payload             (query)
//! label    := 0x00 | 0x01 bytes(utf8)
//! payload  := bytes(json)
//! bytes(x) := len:u32_be x
//! ```
//!
//! JSON payloads pass through `serde_json::Value`, whose object maps are
//! key-sorted, so two payloads that differ only in key order encode to the
//! same bytes. Every variable-length field carries its own length prefix, so
//! no two distinct batches can share an encoding.

use crate::domain::entities::SubMessage;
use crate::domain::errors::EncodingError;

const TAG_INSTANTIATE: u8 = 0x01;
const TAG_EXECUTE: u8 = 0x02;
const TAG_QUERY: u8 = 0x03;

/// Canonically encode a batch's sub-messages.
///
/// Pure and deterministic: identical logical batches always produce
/// identical bytes. Fails with [`EncodingError`] if a payload will not
/// serialize; never panics.
pub fn encode_batch(messages: &[SubMessage]) -> Result<Vec<u8>, EncodingError> {
    let count = u32::try_from(messages.len())
        .map_err(|_| EncodingError::FieldTooLong { len: messages.len() })?;

    let mut out = Vec::with_capacity(64 * messages.len() + 4);
    out.extend_from_slice(&count.to_be_bytes());

    for (index, message) in messages.iter().enumerate() {
        encode_message(&mut out, index, message)?;
    }
    Ok(out)
}

fn encode_message(
    out: &mut Vec<u8>,
    index: usize,
    message: &SubMessage,
) -> Result<(), EncodingError> {
    match message {
        SubMessage::Instantiate {
            code_id,
            label,
            payload,
        } => {
            out.push(TAG_INSTANTIATE);
            out.extend_from_slice(&code_id.to_be_bytes());
            match label {
                None => out.push(0x00),
                Some(text) => {
                    out.push(0x01);
                    put_bytes(out, text.as_bytes())?;
                }
            }
            put_payload(out, index, payload)?;
        }
        SubMessage::Execute { contract, payload } => {
            out.push(TAG_EXECUTE);
            out.extend_from_slice(contract.as_bytes());
            put_payload(out, index, payload)?;
        }
        SubMessage::Query { contract, payload } => {
            out.push(TAG_QUERY);
            out.extend_from_slice(contract.as_bytes());
            put_payload(out, index, payload)?;
        }
    }
    Ok(())
}

fn put_payload(
    out: &mut Vec<u8>,
    index: usize,
    payload: &serde_json::Value,
) -> Result<(), EncodingError> {
    let bytes = serde_json::to_vec(payload)
        .map_err(|source| EncodingError::Payload { index, source })?;
    put_bytes(out, &bytes)
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), EncodingError> {
    let len =
        u32::try_from(bytes.len()).map_err(|_| EncodingError::FieldTooLong { len: bytes.len() })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
