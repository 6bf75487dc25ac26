//! Coercion of list-like and ndarray inputs into dynamic-rank grids.
//!
//! Both engines accept anything implementing [`IntoGrid`]: ndarray arrays
//! (owned, views or references) of any dimensionality, flat lists and
//! rectangular nested lists up to three levels deep. The element trait bound
//! on each entry point decides which element kinds are accepted.

use ndarray::{Array, ArrayBase, ArrayD, Data, Dimension, IxDyn};
use num::Complex;

use crate::ConvError;

/// Real element kinds accepted by the direct convolution.
///
/// Values are promoted to `f64` for the computation and cast back with `as`
/// semantics, so integer results are truncated toward zero.
pub trait ConvNum: Copy + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_conv_num {
    ($($t:ty),*) => {
        $(impl ConvNum for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }
        })*
    };
}

impl_conv_num!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Element kinds accepted by the FFT convolution: every real kind plus
/// complex numbers.
pub trait FftElem: Copy + 'static {
    fn to_complex(self) -> Complex<f64>;
}

impl<T: ConvNum> FftElem for T {
    #[inline]
    fn to_complex(self) -> Complex<f64> {
        Complex::new(self.to_f64(), 0.0)
    }
}

impl FftElem for Complex<f32> {
    #[inline]
    fn to_complex(self) -> Complex<f64> {
        Complex::new(self.re as f64, self.im as f64)
    }
}

impl FftElem for Complex<f64> {
    #[inline]
    fn to_complex(self) -> Complex<f64> {
        self
    }
}

/// Conversion into an owned, dynamic-rank grid.
pub trait IntoGrid {
    type Elem: Copy;

    fn into_grid(self) -> Result<ArrayD<Self::Elem>, ConvError>;
}

impl<A, S, D> IntoGrid for ArrayBase<S, D>
where
    A: Copy,
    S: Data<Elem = A>,
    D: Dimension,
{
    type Elem = A;

    fn into_grid(self) -> Result<ArrayD<A>, ConvError> {
        non_empty(self.into_owned().into_dyn())
    }
}

impl<A, S, D> IntoGrid for &ArrayBase<S, D>
where
    A: Copy,
    S: Data<Elem = A>,
    D: Dimension,
{
    type Elem = A;

    fn into_grid(self) -> Result<ArrayD<A>, ConvError> {
        non_empty(self.to_owned().into_dyn())
    }
}

macro_rules! impl_into_grid_for_lists {
    ($($t:ty),*) => {
        $(
            impl IntoGrid for Vec<$t> {
                type Elem = $t;

                fn into_grid(self) -> Result<ArrayD<$t>, ConvError> {
                    non_empty(Array::from_vec(self).into_dyn())
                }
            }

            impl IntoGrid for &[$t] {
                type Elem = $t;

                fn into_grid(self) -> Result<ArrayD<$t>, ConvError> {
                    non_empty(Array::from_vec(self.to_vec()).into_dyn())
                }
            }

            impl<const N: usize> IntoGrid for [$t; N] {
                type Elem = $t;

                fn into_grid(self) -> Result<ArrayD<$t>, ConvError> {
                    non_empty(Array::from_vec(self.to_vec()).into_dyn())
                }
            }

            impl IntoGrid for Vec<Vec<$t>> {
                type Elem = $t;

                fn into_grid(self) -> Result<ArrayD<$t>, ConvError> {
                    non_empty(from_nested2(self)?)
                }
            }

            impl IntoGrid for Vec<Vec<Vec<$t>>> {
                type Elem = $t;

                fn into_grid(self) -> Result<ArrayD<$t>, ConvError> {
                    non_empty(from_nested3(self)?)
                }
            }
        )*
    };
}

impl_into_grid_for_lists!(
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    Complex<f32>,
    Complex<f64>
);

fn non_empty<A>(grid: ArrayD<A>) -> Result<ArrayD<A>, ConvError> {
    if grid.is_empty() {
        return Err(ConvError::InputType(format!(
            "cannot convolve an empty array of shape {:?}",
            grid.shape()
        )));
    }
    Ok(grid)
}

fn from_nested2<A: Copy>(rows: Vec<Vec<A>>) -> Result<ArrayD<A>, ConvError> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(ConvError::InputType(
            "nested lists must be rectangular".to_string(),
        ));
    }

    let shape = [rows.len(), ncols];
    let data: Vec<A> = rows.into_iter().flatten().collect();

    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

fn from_nested3<A: Copy>(planes: Vec<Vec<Vec<A>>>) -> Result<ArrayD<A>, ConvError> {
    let nplanes = planes.len();
    let mut data = Vec::new();
    let mut plane_shape: Option<Vec<usize>> = None;

    for plane in planes {
        let plane = from_nested2(plane)?;
        match &plane_shape {
            Some(shape) if shape.as_slice() != plane.shape() => {
                return Err(ConvError::InputType(
                    "nested lists must be rectangular".to_string(),
                ));
            }
            Some(_) => {}
            None => plane_shape = Some(plane.shape().to_vec()),
        }
        data.extend(plane.iter().copied());
    }

    let plane_shape = plane_shape.unwrap_or_else(|| vec![0, 0]);
    let shape = [nplanes, plane_shape[0], plane_shape[1]];

    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}
