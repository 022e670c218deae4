//! Separable image resampling.

use crate::common::*;

/// Interpolation methods of [resize].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    Bilinear,
    Bicubic,
    /// Pixel-area averaging when shrinking, bilinear when enlarging.
    Area,
    /// Lanczos with a window of 4 lobes.
    Lanczos,
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Bilinear
    }
}

impl Display for Interpolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
            Interpolation::Area => "area",
            Interpolation::Lanczos => "lanczos",
        };
        write!(f, "{}", text)
    }
}

impl std::str::FromStr for Interpolation {
    type Err = TransformError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let interpolation = match text {
            "nearest" => Interpolation::Nearest,
            "bilinear" => Interpolation::Bilinear,
            "bicubic" => Interpolation::Bicubic,
            "area" => Interpolation::Area,
            "lanczos" => Interpolation::Lanczos,
            _ => {
                return Err(TransformError::Value(format!(
                    "unsupported interpolation '{}'",
                    text
                )))
            }
        };
        Ok(interpolation)
    }
}

/// Source indices and weights contributing to one output position.
type Taps = Vec<(usize, f32)>;

/// Resizes an `H×W×C` image to `new_h × new_w`.
pub fn resize(
    image: ArrayView3<'_, f32>,
    new_h: usize,
    new_w: usize,
    interpolation: Interpolation,
) -> Array3<f32> {
    let (h, w, c) = image.dim();
    let row_taps = axis_taps(h, new_h, interpolation);
    let col_taps = axis_taps(w, new_w, interpolation);

    let mut vertical = Array3::<f32>::zeros((new_h, w, c));
    for (taps, mut out) in row_taps.iter().zip(vertical.outer_iter_mut()) {
        for &(index, weight) in taps {
            out.scaled_add(weight, &image.index_axis(Axis(0), index));
        }
    }

    let mut output = Array3::<f32>::zeros((new_h, new_w, c));
    for (taps, mut out) in col_taps.iter().zip(output.axis_iter_mut(Axis(1))) {
        for &(index, weight) in taps {
            out.scaled_add(weight, &vertical.index_axis(Axis(1), index));
        }
    }

    output
}

fn axis_taps(src_len: usize, dst_len: usize, interpolation: Interpolation) -> Vec<Taps> {
    let scale = src_len as f64 / dst_len as f64;

    (0..dst_len)
        .map(|dst| match interpolation {
            Interpolation::Nearest => {
                let index = ((dst as f64 * scale).floor() as usize).min(src_len - 1);
                vec![(index, 1.0)]
            }
            Interpolation::Area if scale > 1.0 => area_taps(src_len, dst, scale),
            Interpolation::Bilinear | Interpolation::Area => {
                kernel_taps(src_len, dst, scale, 1.0, triangle)
            }
            Interpolation::Bicubic => kernel_taps(src_len, dst, scale, 2.0, cubic),
            Interpolation::Lanczos => kernel_taps(src_len, dst, scale, 4.0, lanczos4),
        })
        .collect()
}

fn kernel_taps(src_len: usize, dst: usize, scale: f64, support: f64, kernel: fn(f64) -> f64) -> Taps {
    let center = (dst as f64 + 0.5) * scale - 0.5;
    let first = (center - support).floor() as i64 + 1;
    let last = (center + support).floor() as i64;
    let max_index = src_len as i64 - 1;

    let taps: Vec<_> = (first..=last)
        .map(|index| {
            let weight = kernel(center - index as f64);
            (index.clamp(0, max_index) as usize, weight)
        })
        .collect();
    normalize(taps)
}

fn area_taps(src_len: usize, dst: usize, scale: f64) -> Taps {
    let start = dst as f64 * scale;
    let end = (start + scale).min(src_len as f64);

    let taps: Vec<_> = (start.floor() as usize..end.ceil() as usize)
        .map(|index| {
            let overlap = end.min(index as f64 + 1.0) - start.max(index as f64);
            (index.min(src_len - 1), overlap)
        })
        .filter(|&(_, overlap)| overlap > 0.0)
        .collect();
    normalize(taps)
}

fn normalize(taps: Vec<(usize, f64)>) -> Taps {
    let sum: f64 = taps.iter().map(|&(_, weight)| weight).sum();
    let sum = if sum.abs() > f64::EPSILON { sum } else { 1.0 };
    taps.into_iter()
        .map(|(index, weight)| (index, (weight / sum) as f32))
        .collect()
}

fn triangle(t: f64) -> f64 {
    (1.0 - t.abs()).max(0.0)
}

/// Keys cubic convolution with `a = -0.75`.
fn cubic(t: f64) -> f64 {
    const A: f64 = -0.75;
    let t = t.abs();
    if t <= 1.0 {
        ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        ((A * t - 5.0 * A) * t + 8.0 * A) * t - 4.0 * A
    } else {
        0.0
    }
}

fn lanczos4(t: f64) -> f64 {
    const LOBES: f64 = 4.0;
    if t.abs() < 1e-8 {
        1.0
    } else if t.abs() < LOBES {
        let x = PI * t;
        LOBES * x.sin() * (x / LOBES).sin() / (x * x)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gradient(h: usize, w: usize, c: usize) -> Array3<f32> {
        Array3::from_shape_fn((h, w, c), |(y, x, ch)| (y * w + x) as f32 + ch as f32 * 0.5)
    }

    #[test]
    fn same_size_is_identity() {
        let image = gradient(6, 7, 3);
        for interpolation in [Interpolation::Nearest, Interpolation::Bilinear, Interpolation::Bicubic] {
            let output = resize(image.view(), 6, 7, interpolation);
            for (lhs, rhs) in output.iter().zip(image.iter()) {
                assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn area_averages_blocks() {
        let image = gradient(4, 4, 1);
        let output = resize(image.view(), 2, 2, Interpolation::Area);
        assert_abs_diff_eq!(output[[0, 0, 0]], (0.0 + 1.0 + 4.0 + 5.0) / 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(output[[1, 1, 0]], (10.0 + 11.0 + 14.0 + 15.0) / 4.0, epsilon = 1e-5);
    }

    #[test]
    fn constant_image_stays_constant() {
        let image = Array3::from_elem((5, 9, 2), 0.25f32);
        for interpolation in [
            Interpolation::Nearest,
            Interpolation::Bilinear,
            Interpolation::Bicubic,
            Interpolation::Area,
            Interpolation::Lanczos,
        ] {
            for (new_h, new_w) in [(10, 18), (3, 4)] {
                let output = resize(image.view(), new_h, new_w, interpolation);
                assert_eq!(output.dim(), (new_h, new_w, 2));
                assert!(output.iter().all(|&value| (value - 0.25).abs() <= 1e-5));
            }
        }
    }

    #[test]
    fn interpolation_from_str() {
        assert_eq!("lanczos".parse::<Interpolation>().unwrap(), Interpolation::Lanczos);
        assert!("cubic".parse::<Interpolation>().unwrap_err().is_value_error());
        assert_eq!(Interpolation::default().to_string(), "bilinear");
    }
}
