//! `Extend` policy: samples outside the array repeat the nearest edge value.

use ndarray::{Array, ArrayBase, Axis, Data, Dim, Ix, RemoveAxis};

use super::{dim, padding_const, Policy};

pub(crate) struct Extend;

impl Policy for Extend {
    fn pad<S, const N: usize>(
        &self,
        input: &ArrayBase<S, Dim<[Ix; N]>>,
        half: [usize; N],
    ) -> Array<f64, Dim<[Ix; N]>>
    where
        S: Data<Elem = f64>,
        Dim<[Ix; N]>: RemoveAxis,
    {
        let mut output = padding_const(input, half, 0.0);

        half.iter().enumerate().for_each(|(d, &h)| {
            dim::extend(&mut output, d, h, input.len_of(Axis(d)));
        });

        output
    }
}
