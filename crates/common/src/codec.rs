//! Strict hex decoding for untrusted request fields.

use crate::error::HexError;

/// Decode `input` into exactly `expected_len` bytes.
///
/// An optional `0x`/`0X` prefix is stripped and an odd number of digits is
/// left-padded with a single `0`, so `"0xabc"` decodes like `"0abc"`. The
/// decoded length must match `expected_len` exactly; nothing is truncated or
/// padded to fit.
pub fn decode(input: &str, expected_len: usize) -> Result<Vec<u8>, HexError> {
    let digits = strip_prefix(input);

    let bytes = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))?
    } else {
        hex::decode(digits)?
    };

    if bytes.len() != expected_len {
        return Err(HexError::Length {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    Ok(bytes)
}

/// Decode `input` into a fixed-size array.
pub fn decode_array<const N: usize>(input: &str) -> Result<[u8; N], HexError> {
    let bytes = decode(input, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Lowercase hex with a `0x` prefix.
pub fn encode_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn strip_prefix(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}
