//! Array kernels on `H×W` and `H×W×C` images.

pub mod affine;
pub mod color;
pub mod geometry;
pub mod morphology;
pub mod resample;

pub use affine::*;
pub use color::*;
pub use geometry::*;
pub use morphology::*;
pub use resample::*;

use crate::common::*;

/// The `(height, width)` of a 2-D or 3-D array shape.
pub fn spatial_size(shape: &[usize]) -> Result<(usize, usize)> {
    match *shape {
        [h, w] | [h, w, _] => Ok((h, w)),
        _ => Err(TransformError::Type(format!(
            "expect a 2 or 3 dimensional array, but get shape {:?}",
            shape
        ))),
    }
}

/// Views a 2-D array as `H×W×1` or a 3-D array as is.
pub fn as_hwc<A>(array: &ArrayD<A>) -> Result<ArrayView3<'_, A>> {
    let view = match array.ndim() {
        2 => array.view().insert_axis(Axis(2)),
        3 => array.view(),
        _ => {
            return Err(TransformError::Type(format!(
                "expect a 2 or 3 dimensional array, but get shape {:?}",
                array.shape()
            )))
        }
    };
    view.into_dimensionality::<Ix3>()
        .map_err(|err| TransformError::Type(format!("{}", err)))
}
