//! Resizing by explicit size, scale factor or divisibility constraint.

use crate::{
    common::*,
    ops::{self, Interpolation},
    sample::{Sample, Value},
    utils::{KeysRepr, OptRepr, TupleRepr},
};

/// The `scale` argument of [ResizeInit].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleArg {
    /// A positive scale factor.
    Factor(R64),
    /// A pair of positive integers, where `-1` stands for an unbounded edge.
    Size(Vec<R64>),
}

impl From<f64> for ScaleArg {
    fn from(factor: f64) -> Self {
        ScaleArg::Factor(r64(factor))
    }
}

impl From<(f64, f64)> for ScaleArg {
    fn from((first, second): (f64, f64)) -> Self {
        ScaleArg::Size(vec![r64(first), r64(second)])
    }
}

impl From<(i64, i64)> for ScaleArg {
    fn from((first, second): (i64, i64)) -> Self {
        ScaleArg::Size(vec![r64(first as f64), r64(second as f64)])
    }
}

/// The validated target scale of [Resize].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeScale {
    Factor(f64),
    /// Two edge lengths. As an exact size it is `(width, height)`; with
    /// `keep_ratio` or an infinite entry, the larger value bounds the long
    /// edge and the smaller bounds the short edge.
    Size(f64, f64),
}

impl Display for ResizeScale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            ResizeScale::Factor(factor) => write!(f, "{}", factor),
            ResizeScale::Size(first, second) => write!(f, "{}", TupleRepr(&[first, second])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResizeInit {
    pub keys: Vec<String>,
    #[serde(default)]
    pub scale: Option<ScaleArg>,
    #[serde(default)]
    pub keep_ratio: bool,
    #[serde(default)]
    pub size_factor: Option<usize>,
    #[serde(default)]
    pub max_size: Option<usize>,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl ResizeInit {
    pub fn new<K>(keys: &[K]) -> Self
    where
        K: AsRef<str>,
    {
        Self {
            keys: keys.iter().map(|key| key.as_ref().to_owned()).collect(),
            scale: None,
            keep_ratio: false,
            size_factor: None,
            max_size: None,
            interpolation: Interpolation::default(),
        }
    }

    pub fn scale(self, scale: impl Into<ScaleArg>) -> Self {
        Self {
            scale: Some(scale.into()),
            ..self
        }
    }

    pub fn keep_ratio(self, keep_ratio: bool) -> Self {
        Self { keep_ratio, ..self }
    }

    pub fn size_factor(self, size_factor: usize) -> Self {
        Self {
            size_factor: Some(size_factor),
            ..self
        }
    }

    pub fn max_size(self, max_size: usize) -> Self {
        Self {
            max_size: Some(max_size),
            ..self
        }
    }

    pub fn interpolation(self, interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            ..self
        }
    }

    pub fn build(self) -> Result<Resize> {
        let Self {
            ref keys,
            ref scale,
            keep_ratio,
            size_factor,
            max_size,
            interpolation: _,
        } = self;

        ensure_value!(!keys.is_empty(), "keys must not be empty");
        if let Some(size_factor) = size_factor {
            ensure_value!(size_factor > 0, "size_factor must be positive");
            ensure_value!(
                scale.is_none(),
                "scale must be unset when size_factor is set"
            );
            ensure_value!(
                !keep_ratio,
                "keep_ratio must be false when size_factor is set"
            );
        }
        if let Some(max_size) = max_size {
            ensure_value!(
                size_factor.is_some(),
                "size_factor must be set when max_size is set"
            );
            ensure_value!(max_size > 0, "max_size must be positive");
            if let Some(size_factor) = size_factor {
                ensure_value!(
                    max_size >= size_factor,
                    "max_size must be at least size_factor, but get max_size={} and size_factor={}",
                    max_size,
                    size_factor
                );
            }
        }

        let resolved = scale.as_ref().map(resolve_scale).transpose()?;
        ensure_value!(
            resolved.is_some() || size_factor.is_some(),
            "either scale or size_factor must be set"
        );

        Ok(Resize {
            init: self,
            scale: resolved,
        })
    }
}

fn resolve_scale(scale: &ScaleArg) -> Result<ResizeScale> {
    match scale {
        ScaleArg::Factor(factor) => {
            ensure_value!(*factor > 0.0, "scale factor must be positive, but get {}", factor);
            Ok(ResizeScale::Factor(factor.raw()))
        }
        ScaleArg::Size(values) => {
            let (first, second) = match *values.as_slice() {
                [first, second] => (first.raw(), second.raw()),
                _ => {
                    return Err(TransformError::Type(format!(
                        "scale must be a number or a pair of integers, but get {} numbers",
                        values.len()
                    )))
                }
            };
            ensure_type!(
                first.fract() == 0.0 && second.fract() == 0.0,
                "scale must be a number or a pair of integers, but get ({}, {})",
                first,
                second
            );

            let (first, second) = if first.min(second) == -1.0 {
                (f64::INFINITY, first.max(second))
            } else {
                (first, second)
            };
            ensure_value!(
                first > 0.0 && second > 0.0,
                "scale sizes must be positive or -1, but get {:?}",
                values
            );
            Ok(ResizeScale::Size(first, second))
        }
    }
}

/// The output geometry resolved against the first key.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Plan {
    /// Every key is scaled by the same factor on both axes.
    Uniform(f64),
    /// Every key is resized to exactly `(h, w)`.
    Exact { h: usize, w: usize },
}

/// Resizes images under a sizing policy.
///
/// Writes `img_shape`, `scale_factor`, `keep_ratio` and `interpolation`.
/// 2-D images are returned as `H×W×1`.
#[derive(Debug, Clone)]
pub struct Resize {
    init: ResizeInit,
    scale: Option<ResizeScale>,
}

impl Resize {
    pub fn init(&self) -> ResizeInit {
        self.init.clone()
    }

    /// The validated target scale, if `scale` was given.
    pub fn scale(&self) -> Option<ResizeScale> {
        self.scale
    }

    fn plan(&self, (h, w): (usize, usize)) -> Result<Plan> {
        ensure_value!(h > 0 && w > 0, "cannot resize an empty image");

        if let Some(factor) = self.init.size_factor {
            let (mut new_h, mut new_w) = (h - h % factor, w - w % factor);
            if let Some(max_size) = self.init.max_size {
                let cap = max_size - max_size % factor;
                new_h = new_h.min(cap);
                new_w = new_w.min(cap);
            }
            ensure_value!(
                new_h > 0 && new_w > 0,
                "size {:?} cannot be reduced to a positive multiple of {}",
                (h, w),
                factor
            );
            return Ok(Plan::Exact { h: new_h, w: new_w });
        }

        let plan = match self.scale {
            Some(ResizeScale::Factor(factor)) => Plan::Uniform(factor),
            Some(ResizeScale::Size(first, second))
                if self.init.keep_ratio || first.is_infinite() || second.is_infinite() =>
            {
                let long_edge = first.max(second);
                let short_edge = first.min(second);
                let factor = (long_edge / h.max(w) as f64).min(short_edge / h.min(w) as f64);
                Plan::Uniform(factor)
            }
            Some(ResizeScale::Size(width, height)) => Plan::Exact {
                h: height as usize,
                w: width as usize,
            },
            None => {
                return Err(TransformError::value_error(
                    "either scale or size_factor must be set",
                ))
            }
        };
        Ok(plan)
    }

    pub fn forward(&self, sample: &mut Sample) -> Result<()> {
        let keys = &self.init.keys;
        sample.require(keys)?;

        let (h, w) = ops::spatial_size(&sample.array_shape(&keys[0])?)?;
        let plan = self.plan((h, w))?;
        debug!("resize {:?} from {:?} by {:?}", keys, (h, w), plan);

        let outputs: Vec<Value> = keys
            .iter()
            .map(|key| self.resize_value(key, sample.get(key)?, plan))
            .collect::<Result<_>>()?;
        let img_shape = outputs[0]
            .array_shape()
            .map(|shape| shape.to_vec())
            .unwrap_or_default();
        for (key, value) in keys.iter().zip(outputs) {
            sample.insert(key.as_str(), value);
        }

        let scale_factor = match plan {
            Plan::Uniform(factor) => Value::Float(factor),
            Plan::Exact { h: new_h, w: new_w } => {
                let w_scale = new_w as f64 / w as f64;
                let h_scale = new_h as f64 / h as f64;
                Value::Floats(vec![w_scale, h_scale, w_scale, h_scale])
            }
        };

        sample.insert("img_shape", Value::Shape(img_shape));
        sample.insert("scale_factor", scale_factor);
        sample.insert("keep_ratio", self.init.keep_ratio);
        sample.insert("interpolation", self.init.interpolation.to_string());
        Ok(())
    }

    fn resize_value(&self, key: &str, value: &Value, plan: Plan) -> Result<Value> {
        let resize_one = |image: &ArrayD<f32>| -> Result<ArrayD<f32>> {
            let view = ops::as_hwc(image)?;
            let (h, w, _) = view.dim();
            let (new_h, new_w) = match plan {
                Plan::Exact { h, w } => (h, w),
                Plan::Uniform(factor) => (scaled_len(h, factor), scaled_len(w, factor)),
            };
            ensure_value!(
                new_h > 0 && new_w > 0,
                "resizing {:?} at key '{}' yields an empty image",
                (h, w),
                key
            );
            Ok(ops::resize(view, new_h, new_w, self.init.interpolation).into_dyn())
        };

        let output = match value {
            Value::Image(image) => Value::Image(resize_one(image)?),
            Value::Frames(frames) => Value::Frames(
                frames
                    .iter()
                    .map(resize_one)
                    .collect::<Result<_>>()?,
            ),
            other => {
                return Err(TransformError::Type(format!(
                    "cannot resize {} at key '{}'",
                    other.kind(),
                    key
                )))
            }
        };
        Ok(output)
    }
}

fn scaled_len(len: usize, factor: f64) -> usize {
    (len as f64 * factor + 0.5).floor() as usize
}

impl Display for Resize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let ResizeInit {
            ref keys,
            keep_ratio,
            size_factor,
            max_size,
            interpolation,
            ..
        } = self.init;
        write!(
            f,
            "Resize(keys={}, scale={}, keep_ratio={}, size_factor={}, max_size={}, interpolation={})",
            KeysRepr(keys),
            OptRepr(&self.scale),
            keep_ratio,
            OptRepr(&size_factor),
            OptRepr(&max_size),
            interpolation
        )
    }
}
