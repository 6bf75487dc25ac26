use ndarray::{Array, Axis, Dim, Ix, RemoveAxis};

/// Fills the padded border of axis `dim` by copying interior lanes chosen by
/// `source(j)`, where `j` is a padded index along that axis.
#[inline]
fn fill_border<const N: usize>(
    buffer: &mut Array<f64, Dim<[Ix; N]>>,
    dim: usize,
    half: usize,
    input_len: usize,
    source: impl Fn(usize) -> usize,
) where
    Dim<[Ix; N]>: RemoveAxis,
{
    let padded_len = buffer.len_of(Axis(dim));
    for j in (0..half).chain(half + input_len..padded_len) {
        let lane = buffer.index_axis(Axis(dim), source(j)).to_owned();
        buffer.index_axis_mut(Axis(dim), j).assign(&lane);
    }
}

#[inline]
pub fn wrap<const N: usize>(
    buffer: &mut Array<f64, Dim<[Ix; N]>>,
    dim: usize,
    half: usize,
    input_len: usize,
) where
    Dim<[Ix; N]>: RemoveAxis,
{
    fill_border(buffer, dim, half, input_len, |j| {
        half + (j as isize - half as isize).rem_euclid(input_len as isize) as usize
    });
}

#[inline]
pub fn extend<const N: usize>(
    buffer: &mut Array<f64, Dim<[Ix; N]>>,
    dim: usize,
    half: usize,
    input_len: usize,
) where
    Dim<[Ix; N]>: RemoveAxis,
{
    fill_border(buffer, dim, half, input_len, |j| {
        j.clamp(half, half + input_len - 1)
    });
}
