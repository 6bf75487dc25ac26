//! `None` policy: samples outside the array are excluded.
//!
//! Edge cells are computed as if the kernel were renormalized to its
//! in-bounds portion.

use ndarray::{Array, ArrayBase, Data, Dim, Ix, RemoveAxis};

use super::{padding_const, Policy};

pub(crate) struct Excluded;

impl Policy for Excluded {
    fn pad<S, const N: usize>(
        &self,
        input: &ArrayBase<S, Dim<[Ix; N]>>,
        half: [usize; N],
    ) -> Array<f64, Dim<[Ix; N]>>
    where
        S: Data<Elem = f64>,
        Dim<[Ix; N]>: RemoveAxis,
    {
        padding_const(input, half, f64::NAN)
    }
}
