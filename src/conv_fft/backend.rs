//! FFT backend selection.
//!
//! The engine only needs a forward and an inverse n-dimensional transform.
//! Which implementation provides them is resolved once per call from the
//! caller's [`FftConfig`] and the per-call override, and handed down as a
//! boxed [`FftBackend`] strategy.

use std::{fmt, str::FromStr};

use ndarray::ArrayD;
use num::complex::Complex64;

use super::processor;
use crate::ConvError;

/// A pair of n-dimensional transforms over complex grids of any shape.
pub trait FftBackend {
    /// Unnormalized forward transform.
    fn forward(&mut self, input: ArrayD<Complex64>) -> ArrayD<Complex64>;

    /// Inverse transform, divided by the number of elements.
    fn inverse(&mut self, input: ArrayD<Complex64>) -> ArrayD<Complex64>;
}

/// Available transform implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FftType {
    /// Lanes of every axis transformed in parallel on a dedicated thread pool.
    NativeThreaded,
    /// Scalar planner only; results do not depend on the host's SIMD support.
    Precision,
    /// Single-threaded planner with SIMD detection.
    Default,
}

impl FftType {
    /// Whether this backend was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            FftType::NativeThreaded => cfg!(feature = "threaded"),
            FftType::Precision | FftType::Default => true,
        }
    }

    /// The next backend to try when this one is unavailable.
    pub fn fallback(self) -> Option<FftType> {
        match self {
            FftType::NativeThreaded => Some(FftType::Precision),
            FftType::Precision => Some(FftType::Default),
            FftType::Default => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FftType::NativeThreaded => "native-threaded",
            FftType::Precision => "precision",
            FftType::Default => "default",
        }
    }
}

impl fmt::Display for FftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FftType {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native-threaded" => Ok(FftType::NativeThreaded),
            "precision" => Ok(FftType::Precision),
            "default" => Ok(FftType::Default),
            other => Err(ConvError::Configuration(format!(
                "invalid fft_type specified: {other}"
            ))),
        }
    }
}

/// Defaults used when a call does not name a backend or a thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftConfig {
    pub fft_type: FftType,
    /// Threads for the `native-threaded` backend. Must be positive.
    pub nthreads: usize,
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            fft_type: FftType::NativeThreaded,
            nthreads: 1,
        }
    }
}

/// Picks the backend for one call.
///
/// An explicitly requested backend must be available. A backend taken from
/// `config` is downgraded along [`FftType::fallback`] with a warning.
pub fn resolve(requested: Option<FftType>, config: &FftConfig) -> Result<FftType, ConvError> {
    resolve_with(requested, config, FftType::is_available)
}

fn resolve_with(
    requested: Option<FftType>,
    config: &FftConfig,
    available: impl Fn(FftType) -> bool,
) -> Result<FftType, ConvError> {
    if let Some(fft_type) = requested {
        if available(fft_type) {
            return Ok(fft_type);
        }
        return Err(ConvError::Configuration(format!(
            "fft_type={fft_type} specified, but it is not available"
        )));
    }

    let mut fft_type = config.fft_type;
    while !available(fft_type) {
        let next = fft_type.fallback().ok_or_else(|| {
            ConvError::Configuration(format!(
                "{fft_type} fft is not available and there is no fallback"
            ))
        })?;
        log::warn!("{fft_type} fft is not available, using {next} for the FFT calculations");
        fft_type = next;
    }

    Ok(fft_type)
}

/// Instantiates the resolved backend.
///
/// `native-threaded` with a single thread runs on the calling thread, without
/// a pool.
pub fn build(fft_type: FftType, nthreads: usize) -> Result<Box<dyn FftBackend>, ConvError> {
    if nthreads == 0 {
        return Err(ConvError::Configuration(
            "nthreads must be a positive integer".to_string(),
        ));
    }

    match fft_type {
        #[cfg(feature = "threaded")]
        FftType::NativeThreaded if nthreads == 1 => {
            Ok(Box::new(processor::complex::Processor::default()))
        }
        #[cfg(feature = "threaded")]
        FftType::NativeThreaded => Ok(Box::new(processor::threaded::Processor::new(nthreads)?)),
        #[cfg(not(feature = "threaded"))]
        FftType::NativeThreaded => Err(ConvError::Configuration(
            "native-threaded fft requires the `threaded` feature".to_string(),
        )),
        FftType::Precision => Ok(Box::new(processor::complex::Processor::scalar())),
        FftType::Default => Ok(Box::new(processor::complex::Processor::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("native-threaded".parse::<FftType>().unwrap(), FftType::NativeThreaded);
        assert_eq!("precision".parse::<FftType>().unwrap(), FftType::Precision);
        assert_eq!("default".parse::<FftType>().unwrap(), FftType::Default);
        assert!(matches!(
            "fftw".parse::<FftType>(),
            Err(ConvError::Configuration(_))
        ));
        assert_eq!(FftType::Precision.to_string(), "precision");
    }

    #[test]
    fn configured_backend_falls_back_in_order() {
        let config = FftConfig::default();

        let only_default = |t: FftType| t == FftType::Default;
        assert_eq!(
            resolve_with(None, &config, only_default).unwrap(),
            FftType::Default
        );

        let no_threads = |t: FftType| t != FftType::NativeThreaded;
        assert_eq!(
            resolve_with(None, &config, no_threads).unwrap(),
            FftType::Precision
        );

        let nothing = |_: FftType| false;
        assert!(matches!(
            resolve_with(None, &config, nothing),
            Err(ConvError::Configuration(_))
        ));
    }

    #[test]
    fn requested_backend_never_falls_back() {
        let config = FftConfig::default();
        let no_threads = |t: FftType| t != FftType::NativeThreaded;

        assert!(matches!(
            resolve_with(Some(FftType::NativeThreaded), &config, no_threads),
            Err(ConvError::Configuration(_))
        ));
        assert_eq!(
            resolve_with(Some(FftType::Default), &config, no_threads).unwrap(),
            FftType::Default
        );
    }

    #[cfg(feature = "threaded")]
    #[test]
    fn single_thread_native_matches_multi_thread() {
        use approx::assert_abs_diff_eq;
        use ndarray::Array;

        let arr = Array::from_shape_fn((4, 6), |(i, j)| {
            Complex64::new(i as f64, j as f64 - 2.0)
        })
        .into_dyn();

        let mut single = build(FftType::NativeThreaded, 1).unwrap();
        let mut pooled = build(FftType::NativeThreaded, 2).unwrap();
        let a = single.forward(arr.clone());
        let b = pooled.forward(arr.clone());
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        assert_abs_diff_eq!(single.inverse(a), arr, epsilon = 1e-9);
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(matches!(
            build(FftType::Default, 0),
            Err(ConvError::Configuration(_))
        ));
    }
}
