//! Hue, saturation and value jitter of a matted foreground.

use crate::{
    common::*,
    ops,
    sample::{Sample, Value},
    utils::{self, RangeArg, TupleRepr},
};
use ndarray::Zip;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandomJitterInit {
    /// Hue shift range in degrees.
    #[serde(default = "default_hue_range")]
    pub hue_range: RangeArg,
    #[serde(default = "default_fg_key")]
    pub fg_key: String,
    #[serde(default = "default_alpha_key")]
    pub alpha_key: String,
}

fn default_hue_range() -> RangeArg {
    RangeArg::Scalar(r64(40.0))
}

fn default_fg_key() -> String {
    "fg".into()
}

fn default_alpha_key() -> String {
    "alpha".into()
}

impl Default for RandomJitterInit {
    fn default() -> Self {
        Self {
            hue_range: default_hue_range(),
            fg_key: default_fg_key(),
            alpha_key: default_alpha_key(),
        }
    }
}

impl RandomJitterInit {
    pub fn build(self) -> Result<RandomJitter> {
        let Self {
            hue_range,
            fg_key,
            alpha_key,
        } = self;

        let (lo, hi) = hue_range.to_symmetric_range("hue_range")?;
        ensure_value!(
            lo >= -180.0 && hi <= 180.0,
            "hue_range must be within [-180, 180], but get ({}, {})",
            lo,
            hi
        );

        Ok(RandomJitter {
            hue_range: (lo, hi),
            fg_key,
            alpha_key,
        })
    }
}

/// Shifts the hue of the whole foreground and perturbs saturation and value
/// relative to their mean over the opaque region.
///
/// The foreground is a BGR image with pixel values within `[0, 255]`.
/// Draws three values per call: the hue offset, the saturation coin and the
/// value coin.
#[derive(Debug, Clone)]
pub struct RandomJitter {
    hue_range: (f64, f64),
    fg_key: String,
    alpha_key: String,
}

impl RandomJitter {
    pub fn init(&self) -> RandomJitterInit {
        let (lo, hi) = self.hue_range;
        RandomJitterInit {
            hue_range: RangeArg::Seq(vec![r64(lo), r64(hi)]),
            fg_key: self.fg_key.clone(),
            alpha_key: self.alpha_key.clone(),
        }
    }

    pub fn forward(&self, sample: &mut Sample, rng: &mut dyn RngCore) -> Result<()> {
        let fg = sample.image(&self.fg_key)?;
        let alpha = sample.image(&self.alpha_key)?;

        let fg = fg.view().into_dimensionality::<Ix3>().ok().filter(|fg| fg.dim().2 == 3);
        let fg = fg.ok_or_else(|| {
            TransformError::Type(format!("expect a H×W×3 image at key '{}'", self.fg_key))
        })?;
        let (h, w, _) = fg.dim();
        let alpha_size = ops::spatial_size(alpha.shape())?;
        ensure_type!(
            alpha_size == (h, w),
            "alpha size {:?} does not match foreground size {:?}",
            alpha_size,
            (h, w)
        );
        let alpha = ops::as_hwc(alpha)?;

        let hsv: Array2<[f32; 3]> = Zip::from(fg.lanes(Axis(2))).map_collect(|bgr| {
            ops::bgr_to_hsv([bgr[0] / 255.0, bgr[1] / 255.0, bgr[2] / 255.0])
        });
        let opaque: Array2<bool> =
            Zip::from(alpha.lanes(Axis(2))).map_collect(|alpha| alpha.iter().any(|&value| value > 0.0));

        let hue_offset = self.sample_hue_offset(&mut *rng);
        let sat_coin: f64 = rng.gen();
        let val_coin: f64 = rng.gen();

        let num_opaque = opaque.iter().filter(|&&opaque| opaque).count();
        let jitter_of = |channel: usize, coin: f64| -> f32 {
            if num_opaque == 0 {
                return 0.0;
            }
            let sum: f64 = Zip::from(&hsv)
                .and(&opaque)
                .fold(0.0, |sum, pixel, &opaque| {
                    if opaque {
                        sum + pixel[channel] as f64
                    } else {
                        sum
                    }
                });
            let mean = sum / num_opaque as f64;
            (coin * (1.1 - mean) / 5.0 - (1.1 - mean) / 10.0) as f32
        };
        let sat_jitter = jitter_of(1, sat_coin);
        let val_jitter = jitter_of(2, val_coin);
        debug!(
            "random jitter hue_offset={} sat_jitter={} val_jitter={}",
            hue_offset, sat_jitter, val_jitter
        );

        let perturb = |value: f32, jitter: f32| {
            let value = (value + jitter).abs();
            if value > 1.0 {
                2.0 - value
            } else {
                value
            }
        };

        let output = Array3::from_shape_fn((h, w, 3), |(y, x, c)| {
            let [hue, sat, val] = hsv[[y, x]];
            let hue = (hue + hue_offset as f32).rem_euclid(360.0);
            let sat = perturb(sat, sat_jitter);
            let val = perturb(val, val_jitter);
            ops::hsv_to_bgr([hue, sat, val])[c] * 255.0
        });

        sample.insert(self.fg_key.as_str(), Value::Image(output.into_dyn()));
        Ok(())
    }

    /// Draws an integer offset within `[lo, hi)`, or `lo` for an empty range.
    fn sample_hue_offset<R>(&self, rng: &mut R) -> i64
    where
        R: Rng + ?Sized,
    {
        let lo = self.hue_range.0.ceil() as i64;
        let hi = self.hue_range.1.ceil() as i64;
        let offset = utils::uniform(rng, lo as f64, hi as f64).floor() as i64;
        if hi > lo {
            offset.clamp(lo, hi - 1)
        } else {
            lo
        }
    }
}

impl Display for RandomJitter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RandomJitter(hue_range={}, fg_key={}, alpha_key={})",
            TupleRepr(&[self.hue_range.0, self.hue_range.1]),
            self.fg_key,
            self.alpha_key
        )
    }
}
