use ndarray::{ArrayD, Axis, Zip};
use num::complex::Complex64;
use rustfft::{FftDirection, FftPlanner};

use super::{normalize, process_lane, Planner};
use crate::{conv_fft::backend::FftBackend, ConvError};

/// Complex-to-complex processor that transforms the lanes of each axis in
/// parallel on its own rayon pool.
pub struct Processor {
    planner: Planner,
    pool: rayon::ThreadPool,
}

impl Processor {
    pub fn new(nthreads: usize) -> Result<Self, ConvError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(nthreads)
            .thread_name(|i| format!("conv-fft-{i}"))
            .build()
            .map_err(|e| ConvError::Configuration(format!("cannot build fft thread pool: {e}")))?;

        Ok(Self {
            planner: Planner::Auto(FftPlanner::new()),
            pool,
        })
    }

    fn transform(&mut self, input: &mut ArrayD<Complex64>, direction: FftDirection) {
        for axis in 0..input.ndim() {
            let fft = self.planner.plan(input.len_of(Axis(axis)), direction);
            let fft = fft.as_ref();

            self.pool.install(|| {
                Zip::from(input.lanes_mut(Axis(axis))).par_for_each(|lane| {
                    let mut buffer = Vec::new();
                    let mut scratch = Vec::new();
                    process_lane(fft, lane, &mut buffer, &mut scratch);
                })
            });
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
