use crate::common::*;
use std::ops::Mul;

/// A 2-D affine map `[a b tx; c d ty]` acting on `(x, y)` pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub tx: f64,
    pub c: f64,
    pub d: f64,
    pub ty: f64,
}

impl Affine {
    pub fn identity() -> Self {
        Self::linear(1.0, 0.0, 0.0, 1.0)
    }

    pub fn linear(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            a,
            b,
            tx: 0.0,
            c,
            d,
            ty: 0.0,
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::identity()
        }
    }

    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::linear(cos, -sin, sin, cos)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::linear(sx, 0.0, 0.0, sy)
    }

    /// Shears along x by `x_radians` and along y by `y_radians`.
    pub fn shear(x_radians: f64, y_radians: f64) -> Self {
        Self::linear(1.0, x_radians.tan(), y_radians.tan(), 1.0)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.tx,
            self.c * x + self.d * y + self.ty,
        )
    }

    /// The inverse map, or `None` if the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return None;
        }

        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        let tx = -(a * self.tx + b * self.ty);
        let ty = -(c * self.tx + d * self.ty);

        Some(Self { a, b, tx, c, d, ty })
    }
}

impl Mul<Affine> for Affine {
    type Output = Affine;

    /// Composes two maps so that `rhs` applies first.
    fn mul(self, rhs: Affine) -> Self::Output {
        Affine {
            a: self.a * rhs.a + self.b * rhs.c,
            b: self.a * rhs.b + self.b * rhs.d,
            tx: self.a * rhs.tx + self.b * rhs.ty + self.tx,
            c: self.c * rhs.a + self.d * rhs.c,
            d: self.c * rhs.b + self.d * rhs.d,
            ty: self.c * rhs.tx + self.d * rhs.ty + self.ty,
        }
    }
}

/// Warps an image so that `output(p) = image(round(inverse(p)))`.
///
/// Output pixels whose source falls outside the image take `fill`.
pub fn warp_affine_nearest(image: ArrayView3<'_, f32>, inverse: &Affine, fill: f32) -> Array3<f32> {
    let (h, w, c) = image.dim();

    Array3::from_shape_fn((h, w, c), |(y, x, ch)| {
        let (sx, sy) = inverse.apply(x as f64, y as f64);
        let (sx, sy) = (sx.round(), sy.round());

        if sx >= 0.0 && sy >= 0.0 && sx < w as f64 && sy < h as f64 {
            image[[sy as usize, sx as usize, ch]]
        } else {
            fill
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_inverse() {
        let orig = Affine::translation(3.0, -2.0)
            * Affine::rotation(0.3)
            * Affine::shear(0.1, -0.2)
            * Affine::scaling(1.5, 0.5);
        let inv = orig.inverse().unwrap();
        let (x, y) = inv.apply(orig.apply(7.0, 11.0).0, orig.apply(7.0, 11.0).1);
        assert!((x - 7.0).abs() <= 1e-9);
        assert!((y - 11.0).abs() <= 1e-9);
        assert!(Affine::scaling(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn affine_composition_order() {
        let transform = Affine::translation(1.0, 0.0) * Affine::scaling(2.0, 2.0);
        assert_eq!(transform.apply(1.0, 1.0), (3.0, 2.0));
    }

    #[test]
    fn warp_identity_and_fill() {
        let image = Array3::from_shape_fn((4, 5, 2), |(y, x, c)| (y * 10 + x + c * 100) as f32);

        let same = warp_affine_nearest(image.view(), &Affine::identity(), 0.5);
        assert_eq!(same, image);

        // shift content one pixel to the right
        let shifted = warp_affine_nearest(image.view(), &Affine::translation(-1.0, 0.0), 0.5);
        assert_eq!(shifted[[2, 0, 1]], 0.5);
        assert_eq!(shifted[[2, 3, 1]], image[[2, 2, 1]]);
    }
}
