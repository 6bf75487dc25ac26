//! Boundary-aware convolution of n-dimensional grids with NaN handling.
//!
//! Two engines are provided:
//!
//! * [`convolve`]: direct convolution of 1, 2 and 3-dimensional grids with an
//!   odd-sized kernel. NaN cells are interpolated from their neighbors, and
//!   the [`Boundary`] policy decides what lies outside the array.
//! * [`convolve_fft`]: FFT convolution of grids of any rank, with power-of-two
//!   or kernel-sized padding, optional NaN interpolation through a weight map,
//!   and a selectable [`FftType`] backend.
//!
//! ```rust
//! use ndarray::array;
//! use ndarray_astroconv::{convolve, Boundary, ConvExt};
//!
//! let arr = array![1.0, 2.0, 3.0];
//! let extended = arr.convolve(array![1.0, 1.0, 1.0], Boundary::Extend, true)?;
//! assert_eq!(extended.shape(), &[3]);
//!
//! let wrapped = convolve(vec![1, 2, 3], vec![1, 2, 1], Boundary::Wrap, false)?;
//! assert_eq!(wrapped, array![7, 8, 9].into_dyn());
//! # Ok::<(), ndarray_astroconv::ConvError>(())
//! ```

mod boundary;
mod conv;
mod conv_fft;
mod error;
mod grid;

pub use conv::{convolve, ConvExt};
pub use conv_fft::{
    backend::{FftBackend, FftConfig, FftType},
    convolve_fft, convolve_fft_spectrum, ConvFftExt, FftConvOptions, FftConvolver, FftLayout,
    Normalization,
};
pub use error::ConvError;
pub use grid::{ConvNum, FftElem, IntoGrid};

/// What the convolution reads beyond the edges of the array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// Out-of-bounds samples are excluded and the kernel is renormalized
    /// over the in-bounds part.
    None,
    /// Out-of-bounds samples take a constant value.
    Fill(f64),
    /// The array repeats periodically.
    Wrap,
    /// Out-of-bounds samples repeat the nearest edge value.
    Extend,
}
