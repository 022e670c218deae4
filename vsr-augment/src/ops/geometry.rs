//! Layout-preserving geometric operations generic over the element type.

use crate::common::*;

/// Fill policy of padded regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadMode {
    /// Fill with zeros.
    Constant,
    /// Mirror the content without repeating the edge pixel.
    Reflect,
}

impl Default for PadMode {
    fn default() -> Self {
        Self::Constant
    }
}

impl Display for PadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            PadMode::Constant => "constant",
            PadMode::Reflect => "reflect",
        };
        write!(f, "{}", text)
    }
}

impl std::str::FromStr for PadMode {
    type Err = TransformError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "constant" => Ok(PadMode::Constant),
            "reflect" => Ok(PadMode::Reflect),
            _ => Err(TransformError::Value(format!(
                "pad mode must be 'constant' or 'reflect', but get '{}'",
                text
            ))),
        }
    }
}

/// Reverses the array along `axis`.
pub fn flip_axis<A>(array: &ArrayD<A>, axis: Axis) -> ArrayD<A>
where
    A: Clone,
{
    let mut view = array.view();
    view.invert_axis(axis);
    view.as_standard_layout().into_owned()
}

/// Swaps the height and width axes, keeping trailing axes in place.
pub fn transpose_hw<A>(array: &ArrayD<A>) -> ArrayD<A>
where
    A: Clone,
{
    let mut view = array.view();
    view.swap_axes(0, 1);
    view.as_standard_layout().into_owned()
}

/// Maps an out-of-range index into `0..len` by mirroring about the edges.
pub fn reflect_index(index: usize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * len - 2;
    let index = index % period;
    if index < len {
        index
    } else {
        period - index
    }
}

/// Extends the first two axes by `pad_h` rows at the bottom and
/// `pad_w` columns on the right.
pub fn pad_bottom_right<A>(array: &ArrayD<A>, pad_h: usize, pad_w: usize, mode: PadMode) -> ArrayD<A>
where
    A: Clone + Zero,
{
    let shape = array.shape();
    let (h, w) = (shape[0], shape[1]);
    let mut new_shape = shape.to_vec();
    new_shape[0] += pad_h;
    new_shape[1] += pad_w;

    ArrayD::from_shape_fn(IxDyn(&new_shape), |mut index| {
        let (y, x) = (index[0], index[1]);
        match mode {
            PadMode::Constant => {
                if y >= h || x >= w {
                    return A::zero();
                }
            }
            PadMode::Reflect => {
                index[0] = reflect_index(y, h);
                index[1] = reflect_index(x, w);
            }
        }
        array[index.slice()].clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_index_test() {
        assert_eq!(reflect_index(3, 4), 3);
        assert_eq!(reflect_index(4, 4), 2);
        assert_eq!(reflect_index(5, 4), 1);
        assert_eq!(reflect_index(6, 4), 0);
        assert_eq!(reflect_index(7, 4), 1);
        assert_eq!(reflect_index(9, 1), 0);
    }

    #[test]
    fn pad_reflect_small() {
        let array = ndarray::arr2(&[[1, 2, 3], [4, 5, 6]]).into_dyn();
        let padded = pad_bottom_right(&array, 1, 2, PadMode::Reflect);
        let expect = ndarray::arr2(&[[1, 2, 3, 2, 1], [4, 5, 6, 5, 4], [1, 2, 3, 2, 1]]).into_dyn();
        assert_eq!(padded, expect);

        let padded = pad_bottom_right(&array, 1, 1, PadMode::Constant);
        let expect = ndarray::arr2(&[[1, 2, 3, 0], [4, 5, 6, 0], [0, 0, 0, 0]]).into_dyn();
        assert_eq!(padded, expect);
    }

    #[test]
    fn flip_and_transpose_keep_channels() {
        let array = Array3::from_shape_fn((2, 3, 2), |(y, x, c)| (y * 100 + x * 10 + c) as i32).into_dyn();

        let flipped = flip_axis(&array, Axis(1));
        assert_eq!(flipped[[1, 0, 1]], array[[1, 2, 1]]);
        assert!(flipped.is_standard_layout());

        let transposed = transpose_hw(&array);
        assert_eq!(transposed.shape(), &[3, 2, 2]);
        assert_eq!(transposed[[2, 1, 0]], array[[1, 2, 0]]);
        assert_eq!(transpose_hw(&transposed), array);
    }
}
