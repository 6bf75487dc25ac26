//! Error type shared by the direct and FFT convolution engines.

use thiserror::Error;

use crate::Boundary;

/// Everything that can abort a convolution call.
///
/// Non-fatal anomalies (NaN treated as zero, backend downgrades) are not
/// errors; they are reported through `log::warn!` and the call proceeds.
#[derive(Debug, Error)]
pub enum ConvError {
    #[error("invalid input: {0}")]
    InputType(String),

    #[error("array and kernel have differing number of dimensions ({array} vs {kernel})")]
    DimensionMismatch { array: usize, kernel: usize },

    #[error("cannot convolve {rank}-dimensional arrays ({reason})")]
    UnsupportedRank { rank: usize, reason: &'static str },

    #[error("kernel extents must be odd in every dimension, got {0:?}")]
    KernelShape(Vec<usize>),

    #[error("fft configuration error: {0}")]
    Configuration(String),

    #[error("boundary {0:?} is not implemented for fft-based convolution")]
    UnsupportedBoundary(Boundary),

    #[error("encountered NaNs in the transformed product, this is disallowed")]
    NumericInvariant,

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
