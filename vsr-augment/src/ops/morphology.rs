use crate::common::*;

/// Maps values above `threshold` to one and the rest to zero.
pub fn binarize<T>(array: &ArrayD<f32>, threshold: f32) -> ArrayD<T>
where
    T: Clone + Zero + num_traits::One,
{
    array.mapv(|value| if value > threshold { T::one() } else { T::zero() })
}

/// Grey dilation by a `kernel_size × kernel_size` square centered on each pixel.
///
/// Out-of-image positions are ignored. Channels are processed independently.
pub fn dilate(image: ArrayView3<'_, f32>, kernel_size: usize) -> Array3<f32> {
    let radius = kernel_size / 2;
    let (h, w, c) = image.dim();
    let window = |center: usize, len: usize| center.saturating_sub(radius)..(center + radius + 1).min(len);

    let rows = Array3::from_shape_fn((h, w, c), |(y, x, ch)| {
        window(x, w)
            .map(|xx| image[[y, xx, ch]])
            .fold(f32::NEG_INFINITY, f32::max)
    });
    Array3::from_shape_fn((h, w, c), |(y, x, ch)| {
        window(y, h)
            .map(|yy| rows[[yy, x, ch]])
            .fold(f32::NEG_INFINITY, f32::max)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binarize_threshold() {
        let array = ndarray::arr1(&[0.2f32, 0.5, 0.6]).into_dyn();
        let floats: ArrayD<f32> = binarize(&array, 0.5);
        let ints: ArrayD<i32> = binarize(&array, 0.5);
        assert_eq!(floats, ndarray::arr1(&[0.0, 0.0, 1.0]).into_dyn());
        assert_eq!(ints, ndarray::arr1(&[0, 0, 1]).into_dyn());
    }

    #[test]
    fn dilate_single_pixel() {
        let mut image = Array3::<f32>::zeros((5, 5, 1));
        image[[2, 2, 0]] = 1.0;

        let dilated = dilate(image.view(), 3);
        let ones = dilated.iter().filter(|&&value| value == 1.0).count();
        assert_eq!(ones, 9);
        assert_eq!(dilated[[1, 1, 0]], 1.0);
        assert_eq!(dilated[[0, 0, 0]], 0.0);

        assert_eq!(dilate(image.view(), 1), image);
    }
}
