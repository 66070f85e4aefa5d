//! Latin-1 repair for forecast payloads.
//!
//! AEMET serves the payload as ISO-8859-1 while labelling it JSON. Every byte
//! is read as the code point of the same value and the text is re-encoded as
//! UTF-8 before parsing.

use crate::error::ForecastError;

/// Decode ISO-8859-1 bytes. Infallible: every byte is a code point.
pub fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}

/// Re-encode a Latin-1 payload as UTF-8 bytes ready for the JSON parser.
pub fn latin1_to_utf8(raw: &[u8]) -> Result<Vec<u8>, ForecastError> {
    let text = decode_latin1(raw);

    // Each byte >= 0x80 becomes a two-byte sequence.
    let expected_len = raw.len() + raw.iter().filter(|b| !b.is_ascii()).count();
    if text.len() != expected_len {
        return Err(ForecastError::Encoding(format!(
            "decoded {} bytes into {} UTF-8 bytes, expected {}",
            raw.len(),
            text.len(),
            expected_len
        )));
    }

    String::from_utf8(text.into_bytes())
        .map(String::into_bytes)
        .map_err(|e| ForecastError::Encoding(e.to_string()))
}
