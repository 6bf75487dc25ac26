//! FFT processors backing the [`FftBackend`](super::backend::FftBackend) strategies.
//!
//! A processor transforms a complex grid of any rank by running 1-D FFTs
//! along every axis in turn. Contiguous lanes are transformed in place,
//! strided lanes go through a small gather/scatter buffer.

use std::sync::Arc;

use ndarray::{ArrayD, ArrayViewMut1};
use num::complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner, FftPlannerScalar};

pub mod complex;
#[cfg(feature = "threaded")]
pub mod threaded;

/// Plans FFTs either with SIMD detection or with the portable scalar planner.
pub(crate) enum Planner {
    Auto(FftPlanner<f64>),
    Scalar(FftPlannerScalar<f64>),
}

impl Planner {
    pub(crate) fn plan(&mut self, len: usize, direction: FftDirection) -> Arc<dyn Fft<f64>> {
        match self {
            Planner::Auto(planner) => planner.plan_fft(len, direction),
            Planner::Scalar(planner) => planner.plan_fft(len, direction),
        }
    }
}

/// Transforms one lane, reusing `buffer` and `scratch` between calls.
pub(crate) fn process_lane(
    fft: &dyn Fft<f64>,
    mut lane: ArrayViewMut1<Complex64>,
    buffer: &mut Vec<Complex64>,
    scratch: &mut Vec<Complex64>,
) {
    let scratch_len = fft.get_inplace_scratch_len();
    if scratch.len() < scratch_len {
        scratch.resize(scratch_len, Complex64::default());
    }

    if let Some(data) = lane.as_slice_mut() {
        fft.process_with_scratch(data, scratch);
        return;
    }

    buffer.clear();
    buffer.extend(lane.iter().copied());
    fft.process_with_scratch(buffer, scratch);
    lane.iter_mut()
        .zip(buffer.iter())
        .for_each(|(dst, &src)| *dst = src);
}

/// Applies the `1/N` factor of the inverse transform.
pub(crate) fn normalize(mut input: ArrayD<Complex64>) -> ArrayD<Complex64> {
    let len = input.len() as f64;
    input.mapv_inplace(|x| x / len);
    input
}
