use crate::{
    common::*,
    ops,
    ratio::Ratio,
    sample::{Sample, Value},
    utils::KeysRepr,
};

/// The mirrored axis of [Flip].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    /// Reverses the width axis.
    Horizontal,
    /// Reverses the height axis.
    Vertical,
}

impl FlipDirection {
    pub fn axis(&self) -> Axis {
        match self {
            FlipDirection::Horizontal => Axis(1),
            FlipDirection::Vertical => Axis(0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlipDirection::Horizontal => "horizontal",
            FlipDirection::Vertical => "vertical",
        }
    }
}

impl Display for FlipDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FlipDirection {
    type Err = TransformError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "horizontal" => Ok(FlipDirection::Horizontal),
            "vertical" => Ok(FlipDirection::Vertical),
            _ => Err(TransformError::Value(format!(
                "flip direction must be 'horizontal' or 'vertical', but get '{}'",
                text
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlipInit {
    pub keys: Vec<String>,
    #[serde(default = "Ratio::half")]
    pub flip_ratio: Ratio,
    /// The fixed direction, or `None` to pick one per call.
    #[serde(default = "default_direction")]
    pub direction: Option<FlipDirection>,
}

fn default_direction() -> Option<FlipDirection> {
    Some(FlipDirection::Horizontal)
}

impl FlipInit {
    /// Creates a configuration from loosely typed arguments, validating the
    /// ratio and the direction name.
    pub fn new<K>(keys: &[K], flip_ratio: f64, direction: Option<&str>) -> Result<Self>
    where
        K: AsRef<str>,
    {
        Ok(Self {
            keys: keys.iter().map(|key| key.as_ref().to_owned()).collect(),
            flip_ratio: Ratio::try_from(flip_ratio)?,
            direction: direction.map(str::parse).transpose()?,
        })
    }

    pub fn build(self) -> Result<Flip> {
        let Self {
            keys,
            flip_ratio,
            direction,
        } = self;
        ensure_value!(!keys.is_empty(), "keys must not be empty");

        Ok(Flip {
            keys,
            flip_ratio,
            direction,
        })
    }
}

/// Mirrors all keys along one shared axis with probability `flip_ratio`.
///
/// Draws one `f64` coin, then one `bool` for the direction when it is not
/// fixed. Writes `flip` and `flip_direction`.
#[derive(Debug, Clone)]
pub struct Flip {
    keys: Vec<String>,
    flip_ratio: Ratio,
    direction: Option<FlipDirection>,
}

impl Flip {
    pub fn init(&self) -> FlipInit {
        FlipInit {
            keys: self.keys.clone(),
            flip_ratio: self.flip_ratio,
            direction: self.direction,
        }
    }

    pub fn forward(&self, sample: &mut Sample, rng: &mut dyn RngCore) -> Result<()> {
        sample.require(&self.keys)?;

        let flip = self.flip_ratio.sample(&mut *rng);
        let direction = match self.direction {
            Some(direction) => direction,
            None => {
                if rng.gen::<bool>() {
                    FlipDirection::Horizontal
                } else {
                    FlipDirection::Vertical
                }
            }
        };

        if flip {
            debug!("flip {:?} along {} axis", self.keys, direction);
            let axis = direction.axis();

            let outputs: Vec<Value> = self
                .keys
                .iter()
                .map(|key| flip_value(key, sample.get(key)?, axis))
                .collect::<Result<_>>()?;
            for (key, value) in self.keys.iter().zip(outputs) {
                sample.insert(key.as_str(), value);
            }
        }

        sample.insert("flip", flip);
        sample.insert("flip_direction", direction.as_str());
        Ok(())
    }
}

fn flip_value(key: &str, value: &Value, axis: Axis) -> Result<Value> {
    let check = |shape: &[usize]| ops::spatial_size(shape).map(|_| ());

    let output = match value {
        Value::Image(array) => {
            check(array.shape())?;
            Value::Image(ops::flip_axis(array, axis))
        }
        Value::IntImage(array) => {
            check(array.shape())?;
            Value::IntImage(ops::flip_axis(array, axis))
        }
        Value::Frames(frames) => Value::Frames(
            frames
                .iter()
                .map(|frame| {
                    check(frame.shape())?;
                    Ok(ops::flip_axis(frame, axis))
                })
                .collect::<Result<_>>()?,
        ),
        other => {
            return Err(TransformError::Type(format!(
                "cannot flip {} at key '{}'",
                other.kind(),
                key
            )))
        }
    };
    Ok(output)
}

impl Display for Flip {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let direction = self
            .direction
            .map(|direction| direction.as_str())
            .unwrap_or("random");
        write!(
            f,
            "Flip(keys={}, flip_ratio={}, direction={})",
            KeysRepr(&self.keys),
            self.flip_ratio,
            direction
        )
    }
}
