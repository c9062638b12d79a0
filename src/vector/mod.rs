//! Vector transforms: L2 normalization, sign-bit quantization, and the
//! binary32 blob codec used to persist vectors compactly.

pub mod normalize;
pub mod quantize;
pub mod similarity;

pub use normalize::{normalize, NORM_EPSILON};
pub use quantize::{from_blob, to_bits, to_blob};
pub use similarity::{cosim, dot, hamming};
