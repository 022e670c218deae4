//! The random affine warp shared by all configured keys.

use crate::{
    common::*,
    ops::{self, Affine},
    ratio::Ratio,
    sample::{Sample, Value},
    utils::{self, KeysRepr, OptRepr, RangeArg, TupleRepr},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandomAffineInit {
    pub keys: Vec<String>,
    /// Rotation in degrees.
    pub degrees: RangeArg,
    /// Maximum absolute shift as a fraction of width and height.
    #[serde(default)]
    pub translate: Option<Vec<R64>>,
    /// Range of the uniform scaling factor.
    #[serde(default)]
    pub scale: Option<Vec<R64>>,
    /// Shear in degrees, for the x axis or both axes.
    #[serde(default)]
    pub shear: Option<RangeArg>,
    #[serde(default)]
    pub flip_ratio: Option<R64>,
    /// The value of pixels warped in from outside the image.
    #[serde(default = "default_fill")]
    pub fill: R64,
    /// Images with the longer side below this size are not rotated.
    #[serde(default = "default_min_rotate_size")]
    pub min_rotate_size: usize,
}

fn default_fill() -> R64 {
    r64(0.5)
}

fn default_min_rotate_size() -> usize {
    1024
}

impl RandomAffineInit {
    pub fn new<K>(keys: &[K], degrees: impl Into<RangeArg>) -> Self
    where
        K: AsRef<str>,
    {
        Self {
            keys: keys.iter().map(|key| key.as_ref().to_owned()).collect(),
            degrees: degrees.into(),
            translate: None,
            scale: None,
            shear: None,
            flip_ratio: None,
            fill: default_fill(),
            min_rotate_size: default_min_rotate_size(),
        }
    }

    pub fn translate(self, values: &[f64]) -> Self {
        Self {
            translate: Some(values.iter().copied().map(r64).collect()),
            ..self
        }
    }

    pub fn scale(self, values: &[f64]) -> Self {
        Self {
            scale: Some(values.iter().copied().map(r64).collect()),
            ..self
        }
    }

    pub fn shear(self, shear: impl Into<RangeArg>) -> Self {
        Self {
            shear: Some(shear.into()),
            ..self
        }
    }

    pub fn flip_ratio(self, flip_ratio: f64) -> Self {
        Self {
            flip_ratio: Some(r64(flip_ratio)),
            ..self
        }
    }

    pub fn fill(self, fill: f64) -> Self {
        Self {
            fill: r64(fill),
            ..self
        }
    }

    pub fn min_rotate_size(self, min_rotate_size: usize) -> Self {
        Self {
            min_rotate_size,
            ..self
        }
    }

    pub fn build(self) -> Result<RandomAffine> {
        let Self {
            keys,
            degrees,
            translate,
            scale,
            shear,
            flip_ratio,
            fill,
            min_rotate_size,
        } = self;

        ensure_value!(!keys.is_empty(), "keys must not be empty");

        let degrees = degrees.to_symmetric_range("degrees")?;

        let translate = translate
            .map(|values| -> Result<_> {
                let (tx, ty) = utils::exact_pair("translate", &values)?;
                ensure_value!(
                    (0.0..=1.0).contains(&tx) && (0.0..=1.0).contains(&ty),
                    "translate values must be within [0, 1], but get ({}, {})",
                    tx,
                    ty
                );
                Ok((tx, ty))
            })
            .transpose()?;

        let scale = scale
            .map(|values| -> Result<_> {
                let (lo, hi) = utils::exact_pair("scale", &values)?;
                ensure_value!(
                    lo > 0.0 && hi > 0.0,
                    "scale values must be positive, but get ({}, {})",
                    lo,
                    hi
                );
                ensure_value!(lo <= hi, "scale min must not exceed scale max");
                Ok((lo, hi))
            })
            .transpose()?;

        let shear = shear
            .map(|shear| -> Result<_> {
                let ranges = shear.to_axis_ranges("shear")?;
                let x = ranges[0];
                let y = ranges.get(1).copied();

                if let Some(y) = y {
                    let max_tan = |(lo, hi): (f64, f64)| -> f64 {
                        let max = f64::abs(lo).max(f64::abs(hi));
                        if max >= 90.0 {
                            f64::INFINITY
                        } else {
                            max.to_radians().tan()
                        }
                    };
                    ensure_value!(
                        max_tan(x) * max_tan(y) < 1.0,
                        "shear ranges {:?} and {:?} may produce a singular transform",
                        x,
                        y
                    );
                }
                Ok(ShearRange { x, y })
            })
            .transpose()?;

        let flip_ratio = match flip_ratio {
            Some(ratio) => Ratio::try_from(ratio)?,
            None => Ratio::zero(),
        };

        Ok(RandomAffine {
            keys,
            degrees,
            translate,
            scale,
            shear,
            flip_ratio,
            fill,
            min_rotate_size,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ShearRange {
    x: (f64, f64),
    y: Option<(f64, f64)>,
}

/// One draw of [RandomAffine] parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParams {
    /// Rotation in degrees.
    pub angle: f64,
    /// Translation in pixels.
    pub translation: (f64, f64),
    pub scale: f64,
    /// Shear in degrees along x and y.
    pub shear: (f64, f64),
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
}

impl AffineParams {
    /// The forward pixel map of an `h × w` image, centered on the image.
    pub fn to_affine(&self, h: usize, w: usize) -> Affine {
        let (cx, cy) = (w as f64 * 0.5 - 0.5, h as f64 * 0.5 - 0.5);
        let (tx, ty) = self.translation;
        let fx = if self.horizontal_flip { -1.0 } else { 1.0 };
        let fy = if self.vertical_flip { -1.0 } else { 1.0 };

        Affine::translation(cx + tx, cy + ty)
            * Affine::rotation(self.angle.to_radians())
            * Affine::shear(self.shear.0.to_radians(), self.shear.1.to_radians())
            * Affine::scaling(self.scale, self.scale)
            * Affine::scaling(fx, fy)
            * Affine::translation(-cx, -cy)
    }
}

/// Warps all keys with one randomly drawn rotation, translation, scale,
/// shear and flip.
///
/// Draws are consumed in a fixed order regardless of the enabled options:
/// angle, dx, dy, scale, x shear, y shear, horizontal flip, vertical flip.
#[derive(Debug, Clone)]
pub struct RandomAffine {
    keys: Vec<String>,
    degrees: (f64, f64),
    translate: Option<(f64, f64)>,
    scale: Option<(f64, f64)>,
    shear: Option<ShearRange>,
    flip_ratio: Ratio,
    fill: R64,
    min_rotate_size: usize,
}

impl RandomAffine {
    pub fn init(&self) -> RandomAffineInit {
        let pair = |(lo, hi): (f64, f64)| vec![r64(lo), r64(hi)];
        let shear = self.shear.map(|ShearRange { x, y }| {
            let mut values = pair(x);
            if let Some(y) = y {
                values.extend(pair(y));
            }
            RangeArg::Seq(values)
        });

        RandomAffineInit {
            keys: self.keys.clone(),
            degrees: RangeArg::Seq(pair(self.degrees)),
            translate: self.translate.map(pair),
            scale: self.scale.map(pair),
            shear,
            flip_ratio: Some(self.flip_ratio.to_r64()),
            fill: self.fill,
            min_rotate_size: self.min_rotate_size,
        }
    }

    /// Draws the warp parameters of an `h × w` image.
    pub fn sample_params<R>(&self, rng: &mut R, h: usize, w: usize) -> AffineParams
    where
        R: Rng + ?Sized,
    {
        let angle = utils::uniform(rng, self.degrees.0, self.degrees.1);
        let angle = if h.max(w) < self.min_rotate_size {
            0.0
        } else {
            angle
        };

        let (max_dx, max_dy) = self
            .translate
            .map(|(tx, ty)| (tx * w as f64, ty * h as f64))
            .unwrap_or((0.0, 0.0));
        let dx = utils::uniform(rng, -max_dx, max_dx).round();
        let dy = utils::uniform(rng, -max_dy, max_dy).round();

        let (scale_lo, scale_hi) = self.scale.unwrap_or((1.0, 1.0));
        let scale = utils::uniform(rng, scale_lo, scale_hi);

        let (x_range, y_range) = match self.shear {
            Some(ShearRange { x, y }) => (x, y.unwrap_or((0.0, 0.0))),
            None => ((0.0, 0.0), (0.0, 0.0)),
        };
        let shear_x = utils::uniform(rng, x_range.0, x_range.1);
        let shear_y = utils::uniform(rng, y_range.0, y_range.1);

        let horizontal_flip = self.flip_ratio.sample(rng);
        let vertical_flip = self.flip_ratio.sample(rng);

        AffineParams {
            angle,
            translation: (dx, dy),
            scale,
            shear: (shear_x, shear_y),
            horizontal_flip,
            vertical_flip,
        }
    }

    pub fn forward(&self, sample: &mut Sample, rng: &mut dyn RngCore) -> Result<()> {
        sample.require(&self.keys)?;

        let (h, w) = ops::spatial_size(&sample.array_shape(&self.keys[0])?)?;
        let params = self.sample_params(&mut *rng, h, w);
        let inverse = params.to_affine(h, w).inverse().ok_or_else(|| {
            TransformError::Value(format!("singular affine transform {:?}", params))
        })?;
        debug!("random affine on {:?} with {:?}", self.keys, params);

        let outputs: Vec<ArrayD<f32>> = self
            .keys
            .iter()
            .map(|key| -> Result<_> {
                let image = sample.image(key)?;
                let view = ops::as_hwc(image)?;
                let (key_h, key_w, _) = view.dim();
                ensure_type!(
                    (key_h, key_w) == (h, w),
                    "expect spatial size {:?} at key '{}', but get {:?}",
                    (h, w),
                    key,
                    (key_h, key_w)
                );

                let warped = ops::warp_affine_nearest(view, &inverse, self.fill.raw() as f32);
                let warped = if image.ndim() == 2 {
                    warped.index_axis_move(Axis(2), 0).into_dyn()
                } else {
                    warped.into_dyn()
                };
                Ok(warped)
            })
            .collect::<Result<_>>()?;

        for (key, warped) in self.keys.iter().zip(outputs) {
            sample.insert(key.as_str(), Value::Image(warped));
        }

        Ok(())
    }
}

impl Display for RandomAffine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let translate = self.translate.map(|(tx, ty)| TupleRepr(&[tx, ty]).to_string());
        let scale = self.scale.map(|(lo, hi)| TupleRepr(&[lo, hi]).to_string());
        let shear = self.shear.map(|ShearRange { x, y }| match y {
            Some(y) => TupleRepr(&[x.0, x.1, y.0, y.1]).to_string(),
            None => TupleRepr(&[x.0, x.1]).to_string(),
        });

        write!(
            f,
            "RandomAffine(keys={}, degrees={}, translate={}, scale={}, shear={}, flip_ratio={})",
            KeysRepr(&self.keys),
            TupleRepr(&[self.degrees.0, self.degrees.1]),
            OptRepr(&translate),
            OptRepr(&scale),
            OptRepr(&shear),
            self.flip_ratio
        )
    }
}
