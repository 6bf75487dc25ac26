//! Direct (spatial domain) convolution.

use ndarray::{ArrayBase, ArrayD, Data, Dimension};

use crate::{
    boundary::{self, extend::Extend, fill::Fill, none::Excluded, wrap::Wrap},
    Boundary, ConvError, ConvNum, IntoGrid,
};


/// Convolves a 1, 2 or 3-dimensional `array` with `kernel`.
///
/// NaN values of `array` are not propagated: they are replaced by values
/// interpolated with the kernel as interpolation function before convolving.
/// Every kernel extent must be odd so that the kernel has a center cell.
///
/// The kernel is always normalized internally. When `normalize_kernel` is
/// false the result is scaled back by the kernel sum, which gives the plain
/// (un-normalized) convolution.
///
/// The result has the shape and element type of `array`.
///
/// # Example
///
/// ```rust
/// use approx::assert_abs_diff_eq;
/// use ndarray::array;
/// use ndarray_astroconv::{convolve, Boundary};
///
/// let res = convolve(array![1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0], Boundary::Fill(0.0), false)?;
/// assert_abs_diff_eq!(res, array![3.0, 6.0, 5.0].into_dyn(), epsilon = 1e-12);
/// # Ok::<(), ndarray_astroconv::ConvError>(())
/// ```
pub fn convolve<A, K>(
    array: A,
    kernel: K,
    boundary: Boundary,
    normalize_kernel: bool,
) -> Result<ArrayD<A::Elem>, ConvError>
where
    A: IntoGrid,
    A::Elem: ConvNum,
    K: IntoGrid,
    K::Elem: ConvNum,
{
    let array = array.into_grid()?;
    let kernel = kernel.into_grid()?;

    if array.ndim() != kernel.ndim() {
        return Err(ConvError::DimensionMismatch {
            array: array.ndim(),
            kernel: kernel.ndim(),
        });
    }
    if kernel.shape().iter().any(|&len| len % 2 == 0) {
        return Err(ConvError::KernelShape(kernel.shape().to_vec()));
    }

    let array = array.mapv(<A::Elem as ConvNum>::to_f64);
    let kernel = kernel.mapv(<K::Elem as ConvNum>::to_f64);

    // the boundary kernels apply normalized kernels only; a zero-sum kernel
    // is applied as is
    let kernel_sum = kernel.sum();
    let scale = if kernel_sum == 0.0 { 1.0 } else { kernel_sum };
    let kernel = kernel / scale;

    let mut result = dispatch(&array, &kernel, boundary)?;

    if !normalize_kernel {
        result *= scale;
    }

    Ok(result.mapv(<A::Elem as ConvNum>::from_f64))
}

/// Selects the (rank, boundary) variant.
fn dispatch(
    array: &ArrayD<f64>,
    kernel: &ArrayD<f64>,
    boundary: Boundary,
) -> Result<ArrayD<f64>, ConvError> {
    match (array.ndim(), boundary) {
        (0, _) => Err(ConvError::UnsupportedRank {
            rank: 0,
            reason: "cannot convolve 0-dimensional arrays",
        }),
        (1, Boundary::None) => boundary::convolve::<_, 1>(&Excluded, array, kernel),
        (1, Boundary::Fill(value)) => boundary::convolve::<_, 1>(&Fill(value), array, kernel),
        (1, Boundary::Wrap) => boundary::convolve::<_, 1>(&Wrap, array, kernel),
        (1, Boundary::Extend) => boundary::convolve::<_, 1>(&Extend, array, kernel),
        (2, Boundary::None) => boundary::convolve::<_, 2>(&Excluded, array, kernel),
        (2, Boundary::Fill(value)) => boundary::convolve::<_, 2>(&Fill(value), array, kernel),
        (2, Boundary::Wrap) => boundary::convolve::<_, 2>(&Wrap, array, kernel),
        (2, Boundary::Extend) => boundary::convolve::<_, 2>(&Extend, array, kernel),
        (3, Boundary::None) => boundary::convolve::<_, 3>(&Excluded, array, kernel),
        (3, Boundary::Fill(value)) => boundary::convolve::<_, 3>(&Fill(value), array, kernel),
        (3, Boundary::Wrap) => boundary::convolve::<_, 3>(&Wrap, array, kernel),
        (3, Boundary::Extend) => boundary::convolve::<_, 3>(&Extend, array, kernel),
        (rank, _) => Err(ConvError::UnsupportedRank {
            rank,
            reason: "direct convolution supports 1, 2 and 3-dimensional arrays",
        }),
    }
}

/// Direct convolution as a method on ndarray arrays.
pub trait ConvExt<A: ConvNum> {
    /// See [`convolve`].
    fn convolve<K>(
        &self,
        kernel: K,
        boundary: Boundary,
        normalize_kernel: bool,
    ) -> Result<ArrayD<A>, ConvError>
    where
        K: IntoGrid,
        K::Elem: ConvNum;
}

impl<A, S, D> ConvExt<A> for ArrayBase<S, D>
where
    A: ConvNum,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn convolve<K>(
        &self,
        kernel: K,
        boundary: Boundary,
        normalize_kernel: bool,
    ) -> Result<ArrayD<A>, ConvError>
    where
        K: IntoGrid,
        K::Elem: ConvNum,
    {
        convolve(self, kernel, boundary, normalize_kernel)
    }
}
