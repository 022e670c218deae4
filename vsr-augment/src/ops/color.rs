//! BGR and HSV conversion of single pixels.
//!
//! Channels of BGR pixels are within `[0, 1]`. Hue is in degrees within
//! `[0, 360)`, saturation and value within `[0, 1]`.

/// Converts a `[b, g, r]` pixel to `[h, s, v]`.
pub fn bgr_to_hsv([b, g, r]: [f32; 3]) -> [f32; 3] {
    let max = b.max(g).max(r);
    let min = b.min(g).min(r);
    let diff = max - min;

    let v = max;
    let s = if max > 0.0 { diff / max } else { 0.0 };
    let h = if diff <= 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / diff
    } else if max == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [h, s, v]
}

/// Converts a `[h, s, v]` pixel to `[b, g, r]`.
pub fn hsv_to_bgr([h, s, v]: [f32; 3]) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let frac = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * frac);
    let t = v * (1.0 - s * (1.0 - frac));

    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [b, g, r]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn primary_colors() {
        assert_eq!(bgr_to_hsv([0.0, 0.0, 1.0]), [0.0, 1.0, 1.0]);
        assert_eq!(bgr_to_hsv([0.0, 1.0, 0.0]), [120.0, 1.0, 1.0]);
        assert_eq!(bgr_to_hsv([1.0, 0.0, 0.0]), [240.0, 1.0, 1.0]);
        assert_eq!(bgr_to_hsv([0.5, 0.5, 0.5]), [0.0, 0.0, 0.5]);
    }

    #[test]
    fn hsv_round_trip() {
        let pixels = [[0.1, 0.7, 0.3], [0.9, 0.2, 0.4], [0.25, 0.25, 0.8], [0.0, 0.0, 0.0]];
        for pixel in pixels {
            let back = hsv_to_bgr(bgr_to_hsv(pixel));
            for (lhs, rhs) in back.iter().zip(pixel.iter()) {
                assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-5);
            }
        }
    }
}
