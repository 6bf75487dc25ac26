//! Boundary policies for the direct convolution.
//!
//! A policy decides which value the convolution reads when a kernel offset
//! lands outside the array. Every policy materializes those values by padding
//! the array with half the kernel extent on each side; the convolution then
//! slides the flipped kernel over the padded buffer.
//!
//! NaN samples in the padded buffer are *excluded*: they contribute nothing to
//! the weighted sum and their kernel weight is dropped from the local
//! normalization. The `None` policy pads with NaN to get exactly that
//! behavior at the edges.

use ndarray::{
    Array, ArrayBase, ArrayD, ArrayView, Axis, Data, Dim, Dimension, Ix, RemoveAxis, Slice, Zip,
};

use crate::ConvError;

mod dim;
pub(crate) mod extend;
pub(crate) mod fill;
pub(crate) mod none;
pub(crate) mod wrap;

/// How samples outside the array are produced.
pub(crate) trait Policy {
    /// Pads `input` by `half[i]` cells on both sides of axis `i`.
    fn pad<S, const N: usize>(
        &self,
        input: &ArrayBase<S, Dim<[Ix; N]>>,
        half: [usize; N],
    ) -> Array<f64, Dim<[Ix; N]>>
    where
        S: Data<Elem = f64>,
        Dim<[Ix; N]>: RemoveAxis;
}

/// Convolves `array` with the already normalized `kernel` under `policy`.
///
/// NaN cells of `array` are first replaced by the kernel-weighted average of
/// their valid neighbors, then the repaired array is convolved.
pub(crate) fn convolve<P: Policy, const N: usize>(
    policy: &P,
    array: &ArrayD<f64>,
    kernel: &ArrayD<f64>,
) -> Result<ArrayD<f64>, ConvError>
where
    Dim<[Ix; N]>: RemoveAxis,
{
    let array = array.view().into_dimensionality::<Dim<[Ix; N]>>()?;
    let kernel = kernel.view().into_dimensionality::<Dim<[Ix; N]>>()?;

    let half: [usize; N] = std::array::from_fn(|i| kernel.len_of(Axis(i)) / 2);
    let flipped = kernel
        .slice_each_axis(|_| Slice::new(0, None, -1))
        .to_owned();

    let repaired = if array.iter().any(|v| v.is_nan()) {
        Some(interpolate_missing(policy, &array, &flipped, half))
    } else {
        None
    };
    let source = repaired.as_ref().map_or(array.view(), |r| r.view());

    let padded = policy.pad(&source, half);
    let mut output = Array::zeros(source.raw_dim());
    // a cell with no valid sample in reach is 0, unless it is a NaN the
    // repair pass could not fill
    Zip::from(&mut output)
        .and(&source)
        .and(padded.windows(flipped.raw_dim()))
        .for_each(|out, &cell, window| {
            let empty = if cell.is_nan() { f64::NAN } else { 0.0 };
            *out = weighted_sum(window, &flipped).unwrap_or(empty);
        });

    Ok(output.into_dyn())
}

fn interpolate_missing<P: Policy, S, const N: usize>(
    policy: &P,
    array: &ArrayBase<S, Dim<[Ix; N]>>,
    flipped: &Array<f64, Dim<[Ix; N]>>,
    half: [usize; N],
) -> Array<f64, Dim<[Ix; N]>>
where
    S: Data<Elem = f64>,
    Dim<[Ix; N]>: RemoveAxis,
{
    let padded = policy.pad(array, half);
    let mut repaired = array.to_owned();

    Zip::from(&mut repaired)
        .and(padded.windows(flipped.raw_dim()))
        .for_each(|value, window| {
            if value.is_nan() {
                *value = weighted_sum(window, flipped).unwrap_or(f64::NAN);
            }
        });

    repaired
}

/// Weighted sum of one window, renormalized when samples were excluded.
///
/// Returns `None` when samples were excluded and no valid weight remains.
fn weighted_sum<D: Dimension>(window: ArrayView<f64, D>, kernel: &Array<f64, D>) -> Option<f64> {
    let mut top = 0.0;
    let mut bot = 0.0;
    let mut excluded = false;

    for (&value, &weight) in window.iter().zip(kernel.iter()) {
        if value.is_nan() {
            excluded = true;
        } else {
            top += value * weight;
            bot += weight;
        }
    }

    if !excluded {
        Some(top)
    } else if bot != 0.0 {
        Some(top / bot)
    } else {
        None
    }
}

/// Pads with a constant, the starting point of every policy.
fn padding_const<S, const N: usize>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    half: [usize; N],
    value: f64,
) -> Array<f64, Dim<[Ix; N]>>
where
    S: Data<Elem = f64>,
    Dim<[Ix; N]>: Dimension,
{
    let mut output_dim = input.raw_dim();
    for (i, h) in half.iter().enumerate() {
        output_dim[i] += 2 * h;
    }

    let mut output = Array::from_elem(output_dim, value);
    output
        .slice_each_axis_mut(|ax| {
            let start = half[ax.axis.index()];
            Slice::from(start..start + input.len_of(ax.axis))
        })
        .assign(input);

    output
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn weighted_sum_renormalizes_only_when_excluding() {
        let kernel = array![0.25, 0.5, 0.25];

        let full = array![1.0, 2.0, 3.0];
        assert_eq!(weighted_sum(full.view(), &kernel), Some(2.0));

        let holed = array![f64::NAN, 2.0, 4.0];
        let res = weighted_sum(holed.view(), &kernel).unwrap();
        assert_relative_eq!(res, 8.0 / 3.0, epsilon = 1e-12);

        let empty = array![f64::NAN, f64::NAN, f64::NAN];
        assert_eq!(weighted_sum(empty.view(), &kernel), None);
    }
}
