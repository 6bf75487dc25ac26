//! FFT-based convolution with NaN interpolation.
//!
//! The array and the kernel are embedded in a common padded buffer, both are
//! transformed, multiplied and transformed back. NaN cells are zeroed before
//! the transform. With `interpolate_nan` (or `ignore_edge_zeros`) the kernel
//! is also convolved with a weight map marking valid cells, and the result is
//! divided by it, which turns the zeroed cells into kernel-weighted
//! interpolations of their neighbours.

use std::fmt;

use ndarray::{ArrayBase, ArrayD, Data, Dimension, Zip};
use num::complex::Complex64;

use crate::{Boundary, ConvError, FftElem, IntoGrid};

pub mod backend;
mod padding;
mod processor;


pub use padding::FftLayout;

use backend::{FftBackend, FftConfig, FftType};
use padding::ifftshift;

/// Weights this close to zero after smoothing are round-off from the
/// transforms and count as "no valid sample in reach".
const WEIGHT_ROUNDOFF: f64 = 1e-13;

/// How the kernel is normalized before the transform.
#[derive(Clone, Copy)]
pub enum Normalization {
    /// Use the kernel as given. It still counts as normalized when it sums
    /// to one within `1e-8`.
    None,
    /// Divide the kernel by its sum.
    Sum,
    /// Divide the kernel by the value this function returns for it.
    Custom(fn(&ArrayD<Complex64>) -> Complex64),
}

impl fmt::Debug for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::None => f.write_str("None"),
            Normalization::Sum => f.write_str("Sum"),
            Normalization::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Options of one FFT convolution.
#[derive(Debug, Clone, Copy)]
pub struct FftConvOptions {
    /// `Fill(v)` pads with `v`. `None` always pads with zeros, since it
    /// carries no fill value. `Wrap` convolves periodically. `Extend` is not
    /// available here.
    pub boundary: Boundary,
    /// Return only the region covered by the input array.
    pub crop: bool,
    /// Pad every axis to a common power-of-two length.
    pub fft_pad: bool,
    /// Has no effect. Whether every axis is padded by the kernel extent is
    /// decided by `boundary`: `Fill` and `None` always pad, `Wrap` never does.
    pub psf_pad: bool,
    /// Replace NaN cells by kernel-weighted interpolations.
    pub interpolate_nan: bool,
    /// Do not warn about NaN values treated as zero.
    pub quiet: bool,
    /// Treat the padding as missing data rather than as zeros.
    pub ignore_edge_zeros: bool,
    /// Cells whose smoothed weight falls below this become NaN.
    pub min_wt: f64,
    pub normalize_kernel: Normalization,
    /// Backend for this call; `None` uses the configured one.
    pub fft_type: Option<FftType>,
    /// Threads for the threaded backend; `None` uses the configured count.
    pub nthreads: Option<usize>,
}

impl Default for FftConvOptions {
    fn default() -> Self {
        Self {
            boundary: Boundary::Fill(0.0),
            crop: true,
            fft_pad: true,
            psf_pad: false,
            interpolate_nan: false,
            quiet: false,
            ignore_edge_zeros: false,
            min_wt: 0.0,
            normalize_kernel: Normalization::None,
            fft_type: None,
            nthreads: None,
        }
    }
}

/// State shared by [`FftConvolver::convolve`] and [`FftConvolver::spectrum`].
struct Product {
    layout: FftLayout,
    fftmult: ArrayD<Complex64>,
    weights: Option<ArrayD<f64>>,
}

/// An FFT convolution with a resolved backend.
///
/// Resolving the backend (and building its thread pool) happens once in
/// [`FftConvolver::new`]; the convolver can then be reused for many calls.
pub struct FftConvolver {
    options: FftConvOptions,
    backend: Box<dyn FftBackend>,
}

impl FftConvolver {
    pub fn new(options: FftConvOptions, config: &FftConfig) -> Result<Self, ConvError> {
        let fft_type = backend::resolve(options.fft_type, config)?;
        let nthreads = options.nthreads.unwrap_or(config.nthreads);
        let backend = backend::build(fft_type, nthreads)?;

        Ok(Self { options, backend })
    }

    /// A convolver running on a caller-provided backend.
    pub fn with_backend(options: FftConvOptions, backend: Box<dyn FftBackend>) -> Self {
        Self { options, backend }
    }

    /// Convolves `array` with `kernel` and returns the real part of the
    /// result.
    ///
    /// With `crop` the result has the shape of `array`, otherwise the shape
    /// of the padded working buffer.
    pub fn convolve<A, K>(&mut self, array: A, kernel: K) -> Result<ArrayD<f64>, ConvError>
    where
        A: IntoGrid,
        A::Elem: FftElem,
        K: IntoGrid,
        K::Elem: FftElem,
    {
        let Product {
            layout,
            fftmult,
            weights,
        } = self.product(array, kernel)?;

        let mut rifft = self.backend.inverse(fftmult);

        if let Some(weights) = &weights {
            let min_wt = self.options.min_wt;
            Zip::from(&mut rifft).and(weights).for_each(|value, &weight| {
                *value = if min_wt == 0.0 && weight == 0.0 {
                    Complex64::new(0.0, 0.0)
                } else if weight < min_wt {
                    Complex64::new(f64::NAN, 0.0)
                } else {
                    *value / weight
                };
            });
        }

        if self.options.crop {
            Ok(layout.crop(&rifft).mapv(|v| v.re))
        } else {
            Ok(rifft.mapv(|v| v.re))
        }
    }

    /// The frequency-domain product of `array` and `kernel`, before the
    /// inverse transform.
    ///
    /// Its shape is the padded working shape; crop the inverse transform with
    /// an [`FftLayout`] built from the same shapes and padding flags to get
    /// back to the array region.
    pub fn spectrum<A, K>(&mut self, array: A, kernel: K) -> Result<ArrayD<Complex64>, ConvError>
    where
        A: IntoGrid,
        A::Elem: FftElem,
        K: IntoGrid,
        K::Elem: FftElem,
    {
        Ok(self.product(array, kernel)?.fftmult)
    }

    fn product<A, K>(&mut self, array: A, kernel: K) -> Result<Product, ConvError>
    where
        A: IntoGrid,
        A::Elem: FftElem,
        K: IntoGrid,
        K::Elem: FftElem,
    {
        let array = array.into_grid()?.mapv(FftElem::to_complex);
        let kernel = kernel.into_grid()?.mapv(FftElem::to_complex);
        let options = self.options;

        if array.ndim() != kernel.ndim() {
            return Err(ConvError::DimensionMismatch {
                array: array.ndim(),
                kernel: kernel.ndim(),
            });
        }
        if array.ndim() == 0 {
            return Err(ConvError::UnsupportedRank {
                rank: 0,
                reason: "cannot convolve 0-dimensional arrays",
            });
        }

        let (fill_value, psf_pad, fft_pad) = match options.boundary {
            Boundary::None => {
                log::warn!(
                    "boundary None has no FFT equivalent, the array is padded \
                     with zeros instead"
                );
                (0.0, true, options.fft_pad)
            }
            Boundary::Fill(value) => (value, true, options.fft_pad),
            Boundary::Wrap => (0.0, false, false),
            Boundary::Extend => return Err(ConvError::UnsupportedBoundary(Boundary::Extend)),
        };

        let nan_mask = array.mapv(|v| v.is_nan());
        let array_has_nan = nan_mask.iter().any(|&nan| nan);
        let kernel_has_nan = kernel.iter().any(|v| v.is_nan());
        if (array_has_nan || kernel_has_nan) && !options.interpolate_nan && !options.quiet {
            log::warn!("NaN values are present and are treated as 0 (interpolate_nan is off)");
        }

        let zero_nan = |v: Complex64| if v.is_nan() { Complex64::new(0.0, 0.0) } else { v };
        let array = array.mapv_into(zero_nan);
        let kernel = kernel.mapv_into(zero_nan);

        let (kernel, kernel_is_normalized) = match options.normalize_kernel {
            Normalization::Sum => {
                let scale = kernel.sum();
                (kernel.mapv_into(|v| v / scale), true)
            }
            Normalization::Custom(normalizer) => {
                let scale = normalizer(&kernel);
                (kernel.mapv_into(|v| v / scale), true)
            }
            Normalization::None => {
                let normalized = (kernel.sum() - 1.0).norm() < 1e-8;
                (kernel, normalized)
            }
        };

        let layout = FftLayout::new(array.shape(), kernel.shape(), fft_pad, psf_pad);
        log::debug!("fft working shape {:?}", layout.shape());

        let bigarray = layout.embed_array(&array, Complex64::new(fill_value, 0.0));
        let bigkernel = ifftshift(&layout.embed_kernel(&kernel, Complex64::new(0.0, 0.0)));

        let arrayfft = self.backend.forward(bigarray);
        let kernfft = self.backend.forward(bigkernel);
        let fftmult = arrayfft * &kernfft;

        let weighted = options.interpolate_nan || options.ignore_edge_zeros;
        let weights = if weighted && kernel_is_normalized {
            Some(self.weight_map(&layout, &nan_mask, &kernfft, kernel.sum()))
        } else {
            None
        };

        if fftmult.iter().any(|v| v.is_nan()) {
            return Err(ConvError::NumericInvariant);
        }

        Ok(Product {
            layout,
            fftmult,
            weights,
        })
    }

    /// Smoothed map of valid cells.
    ///
    /// The padding is valid unless `ignore_edge_zeros` is set; inside the
    /// array every cell is valid except NaN cells under `interpolate_nan`.
    fn weight_map(
        &mut self,
        layout: &FftLayout,
        nan_mask: &ArrayD<bool>,
        kernfft: &ArrayD<Complex64>,
        kernel_sum: Complex64,
    ) -> ArrayD<f64> {
        let padding = if self.options.ignore_edge_zeros { 0.0 } else { 1.0 };
        let interpolate = self.options.interpolate_nan;

        let valid = nan_mask.mapv(|nan| if nan && interpolate { 0.0 } else { 1.0 });
        let mut bigimwt = layout.embed_array(&valid, padding);

        let wtfft = self.backend.forward(bigimwt.mapv(|w| Complex64::new(w, 0.0)));
        let wtsm = self
            .backend
            .inverse((wtfft * kernfft).mapv_into(|v| v / kernel_sum));

        layout
            .crop_mut(&mut bigimwt)
            .assign(&layout.crop(&wtsm).mapv(|v| v.re));
        bigimwt.mapv_inplace(|w| if w < WEIGHT_ROUNDOFF { 0.0 } else { w });

        bigimwt
    }
}

/// Convolves an n-dimensional `array` with `kernel` using FFTs.
///
/// Any rank of at least one is supported as long as array and kernel agree.
/// The backend is resolved on every call; build an [`FftConvolver`] once to
/// convolve many arrays with the same options. Complex inputs
/// are accepted; the returned value is the real part of the result.
///
/// # Example
///
/// ```rust
/// use approx::assert_abs_diff_eq;
/// use ndarray::array;
/// use ndarray_astroconv::{convolve_fft, FftConfig, FftConvOptions};
///
/// let res = convolve_fft(
///     array![1.0, 0.0, 3.0],
///     array![1.0, 1.0, 1.0],
///     &FftConvOptions::default(),
///     &FftConfig::default(),
/// )?;
/// assert_abs_diff_eq!(res, array![1.0, 4.0, 3.0].into_dyn(), epsilon = 1e-12);
/// # Ok::<(), ndarray_astroconv::ConvError>(())
/// ```
pub fn convolve_fft<A, K>(
    array: A,
    kernel: K,
    options: &FftConvOptions,
    config: &FftConfig,
) -> Result<ArrayD<f64>, ConvError>
where
    A: IntoGrid,
    A::Elem: FftElem,
    K: IntoGrid,
    K::Elem: FftElem,
{
    FftConvolver::new(*options, config)?.convolve(array, kernel)
}

/// The frequency-domain product computed by [`convolve_fft`], returned
/// instead of the convolution. See [`FftConvolver::spectrum`].
pub fn convolve_fft_spectrum<A, K>(
    array: A,
    kernel: K,
    options: &FftConvOptions,
    config: &FftConfig,
) -> Result<ArrayD<Complex64>, ConvError>
where
    A: IntoGrid,
    A::Elem: FftElem,
    K: IntoGrid,
    K::Elem: FftElem,
{
    FftConvolver::new(*options, config)?.spectrum(array, kernel)
}

/// FFT convolution as a method on ndarray arrays, with the default
/// [`FftConfig`].
pub trait ConvFftExt {
    fn convolve_fft<K>(&self, kernel: K, options: &FftConvOptions) -> Result<ArrayD<f64>, ConvError>
    where
        K: IntoGrid,
        K::Elem: FftElem;
}

impl<A, S, D> ConvFftExt for ArrayBase<S, D>
where
    A: FftElem,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn convolve_fft<K>(&self, kernel: K, options: &FftConvOptions) -> Result<ArrayD<f64>, ConvError>
    where
        K: IntoGrid,
        K::Elem: FftElem,
    {
        convolve_fft(self, kernel, options, &FftConfig::default())
    }
}
