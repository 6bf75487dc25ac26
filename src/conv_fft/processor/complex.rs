use ndarray::{ArrayD, Axis};
use num::complex::Complex64;
use rustfft::{FftDirection, FftPlanner, FftPlannerScalar};

use super::{normalize, process_lane, Planner};
use crate::conv_fft::backend::FftBackend;

/// Single-threaded complex-to-complex processor.
pub struct Processor {
    planner: Planner,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            planner: Planner::Auto(FftPlanner::new()),
        }
    }
}

impl Processor {
    /// A processor restricted to scalar code paths, so results do not depend
    /// on the SIMD features of the host.
    pub fn scalar() -> Self {
        Self {
            planner: Planner::Scalar(FftPlannerScalar::new()),
        }
    }

    fn transform(&mut self, input: &mut ArrayD<Complex64>, direction: FftDirection) {
        let mut buffer = Vec::new();
        let mut scratch = Vec::new();

        for axis in 0..input.ndim() {
            let fft = self.planner.plan(input.len_of(Axis(axis)), direction);
            for lane in input.lanes_mut(Axis(axis)) {
                process_lane(fft.as_ref(), lane, &mut buffer, &mut scratch);
            }
        }
    }
}

impl FftBackend for Processor {
    fn forward(&mut self, mut input: ArrayD<Complex64>) -> ArrayD<Complex64> {
        self.transform(&mut input, FftDirection::Forward);
        input
    }

    fn inverse(&mut self, mut input: ArrayD<Complex64>) -> ArrayD<Complex64> {
        self.transform(&mut input, FftDirection::Inverse);
        normalize(input)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};

    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_forward_backward_1d() {
        let mut proc = Processor::default();
        let arr = array![c(1.0), c(2.0), c(3.0), c(4.0)].into_dyn();
        let freq = proc.forward(arr.clone());
        let recon = proc.inverse(freq);
        assert_abs_diff_eq!(recon, arr, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_backward_3d_scalar() {
        let mut proc = Processor::scalar();
        let arr = Array::from_shape_fn((3, 4, 5), |(i, j, k)| {
            Complex64::new((i * 20 + j * 5 + k) as f64, (i + j) as f64)
        })
        .into_dyn();
        let freq = proc.forward(arr.clone());
        let recon = proc.inverse(freq);
        assert_abs_diff_eq!(recon, arr, epsilon = 1e-9);
    }

    #[test]
    fn test_forward_matches_dft_definition() {
        let mut proc = Processor::default();
        let arr = array![[c(1.0), c(2.0)], [c(3.0), c(4.0)]].into_dyn();
        let freq = proc.forward(arr);
        let expected = array![[c(10.0), c(-2.0)], [c(-4.0), c(0.0)]].into_dyn();
        assert_abs_diff_eq!(freq, expected, epsilon = 1e-12);
    }
}
