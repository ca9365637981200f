//! Canonical encoding of signable fields.
//!
//! Compact JSON object, keys in the fixed order `date`, `author`, `message`,
//! `attachment`, with `attachment` omitted when absent. This is byte-for-byte
//! the payload the feed's publishers have always signed, so signatures made
//! by existing clients keep verifying.
//!
//! The encoding is a pure function of [`SignableFields`]: struct fields are
//! serialized in declaration order, strings are escaped the same way every
//! time, and no whitespace is emitted.

use crate::{EncodingError, SignableFields};

/// Encode signable fields into the bytes a signature covers.
///
/// # Errors
///
/// - `Serialize`: the serializer rejected a field
/// - `Malformed`: the output is not a JSON object
///
/// Callers must abort signing or verification on error. There is no
/// fallback payload.
pub fn encode(fields: &SignableFields<'_>) -> Result<Vec<u8>, EncodingError> {
    let bytes = serde_json::to_vec(fields).map_err(|e| EncodingError::Serialize(e.to_string()))?;

    if bytes.first() != Some(&b'{') || bytes.last() != Some(&b'}') {
        return Err(EncodingError::Malformed);
    }

    Ok(bytes)
}
