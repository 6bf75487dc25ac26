//! `Wrap` policy: the array is periodic along every axis.

use ndarray::{Array, ArrayBase, Axis, Data, Dim, Ix, RemoveAxis};

use super::{dim, padding_const, Policy};

pub(crate) struct Wrap;

impl Policy for Wrap {
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

        // axes are filled in order, so corners pick up already wrapped lanes
        half.iter().enumerate().for_each(|(d, &h)| {
            dim::wrap(&mut output, d, h, input.len_of(Axis(d)));
        });

        output
    }
}
