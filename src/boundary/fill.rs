//! `Fill` policy: samples outside the array read a constant.

use ndarray::{Array, ArrayBase, Data, Dim, Ix, RemoveAxis};

use super::{padding_const, Policy};

pub(crate) struct Fill(pub f64);

impl Policy for Fill {
    fn pad<S, const N: usize>(
        &self,
        input: &ArrayBase<S, Dim<[Ix; N]>>,
        half: [usize; N],
    ) -> Array<f64, Dim<[Ix; N]>>
    where
        S: Data<Elem = f64>,
        Dim<[Ix; N]>: RemoveAxis,
    {
        padding_const(input, half, self.0)
    }
}
