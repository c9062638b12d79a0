//! Similarity primitives: dot product over f32 vectors and Hamming
//! distance over packed binary codes.

use crate::error::{QuiverError, Result};
use crate::vector::normalize::normalize;

/// Compute the dot product of two equal-length vectors.
///
/// On pre-normalized inputs this is the cosine similarity, in [-1, 1].
/// Callers are responsible for the length check; the public validated
/// entry point is [`cosim`].
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Compute the Hamming distance between two equal-length binary codes.
///
/// XOR plus popcount. Used only as an ordering signal during the
/// approximate filter stage, never reported as a similarity value.
pub fn hamming(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Compute cosine similarity between two raw (not yet normalized) vectors.
///
/// Both inputs are normalized independently before the dot product.
/// Fails with `InvalidDimension` when the lengths differ.
pub fn cosim(v1: &[f32], v2: &[f32]) -> Result<f32> {
    if v1.len() != v2.len() {
        return Err(QuiverError::InvalidDimension {
            expected: v1.len(),
            actual: v2.len(),
        });
    }
    Ok(dot(&normalize(v1), &normalize(v2)))
}
