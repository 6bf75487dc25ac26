//! Working-buffer layout of the FFT convolution.

use std::ops::Range;

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Axis, IxDyn, Slice};

/// Shape of the padded working buffer and where the array and the kernel sit
/// inside it.
///
/// Both are centered: along each axis of length `n` the center index is
/// `n - (n + 1) / 2`, and an extent `m` occupies
/// `[center - m / 2, center + (m + 1) / 2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FftLayout {
    shape: Vec<usize>,
    array_slices: Vec<Range<usize>>,
    kernel_slices: Vec<Range<usize>>,
}

impl FftLayout {
    /// Computes the layout for an array and a kernel of equal rank.
    ///
    /// * `fft_pad`: every axis gets the same power-of-two length, large enough
    ///   for the largest extent (or the largest array + kernel sum with
    ///   `psf_pad`).
    /// * `psf_pad` alone: each axis is array + kernel long.
    /// * neither: each axis is as long as the larger of array and kernel.
    pub fn new(
        array_shape: &[usize],
        kernel_shape: &[usize],
        fft_pad: bool,
        psf_pad: bool,
    ) -> Self {
        let ndim = array_shape.len();

        let shape: Vec<usize> = if fft_pad {
            let extent = if psf_pad {
                array_shape
                    .iter()
                    .zip(kernel_shape)
                    .map(|(a, k)| a + k)
                    .max()
            } else {
                array_shape.iter().chain(kernel_shape).copied().max()
            };
            vec![extent.unwrap_or(1).next_power_of_two(); ndim]
        } else if psf_pad {
            array_shape
                .iter()
                .zip(kernel_shape)
                .map(|(a, k)| a + k)
                .collect()
        } else {
            array_shape
                .iter()
                .zip(kernel_shape)
                .map(|(&a, &k)| a.max(k))
                .collect()
        };

        let centered = |extents: &[usize]| -> Vec<Range<usize>> {
            shape
                .iter()
                .zip(extents)
                .map(|(&n, &m)| {
                    let center = n - (n + 1) / 2;
                    center - m / 2..center + (m + 1) / 2
                })
                .collect()
        };
        let array_slices = centered(array_shape);
        let kernel_slices = centered(kernel_shape);

        Self {
            shape,
            array_slices,
            kernel_slices,
        }
    }

    /// Shape of the padded working buffer.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The region of a working buffer holding the original array.
    pub fn crop<'a, A>(&self, full: &'a ArrayD<A>) -> ArrayViewD<'a, A> {
        full.slice_each_axis(|ax| Slice::from(self.array_slices[ax.axis.index()].clone()))
    }

    pub(crate) fn crop_mut<'a, A>(&self, full: &'a mut ArrayD<A>) -> ArrayViewMutD<'a, A> {
        full.slice_each_axis_mut(|ax| Slice::from(self.array_slices[ax.axis.index()].clone()))
    }

    /// A working buffer filled with `fill` and holding `array` at its slot.
    pub(crate) fn embed_array<A: Clone>(&self, array: &ArrayD<A>, fill: A) -> ArrayD<A> {
        embed(&self.shape, &self.array_slices, array, fill)
    }

    /// A working buffer filled with `fill` and holding `kernel` at its slot.
    pub(crate) fn embed_kernel<A: Clone>(&self, kernel: &ArrayD<A>, fill: A) -> ArrayD<A> {
        embed(&self.shape, &self.kernel_slices, kernel, fill)
    }
}

fn embed<A: Clone>(
    shape: &[usize],
    slices: &[Range<usize>],
    data: &ArrayD<A>,
    fill: A,
) -> ArrayD<A> {
    let mut buffer = ArrayD::from_elem(IxDyn(shape), fill);
    buffer
        .slice_each_axis_mut(|ax| Slice::from(slices[ax.axis.index()].clone()))
        .assign(data);
    buffer
}

/// Cyclically shifts every axis so that index `n / 2` lands on index 0.
///
/// Applied to a centered kernel this puts the kernel center at the origin,
/// which makes the frequency-domain product a convolution instead of a
/// shifted correlation.
pub(crate) fn ifftshift<A: Clone>(input: &ArrayD<A>) -> ArrayD<A> {
    let mut output = input.to_owned();

    for axis in 0..input.ndim() {
        let n = output.len_of(Axis(axis));
        let shift = n / 2;
        if shift == 0 {
            continue;
        }

        let previous = output.clone();
        output
            .slice_axis_mut(Axis(axis), Slice::from(0..n - shift))
            .assign(&previous.slice_axis(Axis(axis), Slice::from(shift..n)));
        output
            .slice_axis_mut(Axis(axis), Slice::from(n - shift..n))
            .assign(&previous.slice_axis(Axis(axis), Slice::from(0..shift)));
    }

    output
}
