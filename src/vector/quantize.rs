//! Binary quantization and the persisted blob encoding.
//!
//! Two encodings, both bit-exact for interoperability:
//!
//! Sign-bit code (`to_bits`):
//! ```text
//! byte i, bit j (0 <= j < 8) = 1  iff  vector[8*i + j] > 0
//! ```
//! Component 0 maps to the least-significant bit of byte 0; zero and
//! negative components leave their bit unset; pad bits in the final
//! partial byte are zero.
//!
//! Vector blob (`to_blob` / `from_blob`): IEEE-754 binary32 values,
//! little-endian byte order, 4 bytes per component, in component order.

use crate::error::{QuiverError, Result};

/// Quantize a vector into its packed sign-bit code.
///
/// Deterministic and total: identical input always yields identical
/// output, for any length including zero.
pub fn to_bits(vector: &[f32]) -> Vec<u8> {
    let mut code = vec![0u8; vector.len().div_ceil(8)];
    for (i, &component) in vector.iter().enumerate() {
        if component > 0.0 {
            code[i / 8] |= 1 << (i % 8);
        }
    }
    code
}

/// Encode a vector as a binary32 little-endian blob.
pub fn to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for component in vector {
        blob.extend_from_slice(&component.to_le_bytes());
    }
    blob
}

/// Decode a binary32 little-endian blob back into a vector.
///
/// The blob length must be a multiple of 4. Round-tripping an f32 vector
/// through `to_blob`/`from_blob` is exact; vectors that passed through a
/// wider precision upstream may see near-zero components flip sign bit,
/// which is a documented boundary of the encoding, not corruption.
pub fn from_blob(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(QuiverError::InvalidArgument(format!(
            "blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
