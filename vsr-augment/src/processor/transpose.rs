use crate::{
    common::*,
    ops,
    ratio::Ratio,
    sample::{Sample, Value},
    utils::KeysRepr,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandomTransposeHWInit {
    pub keys: Vec<String>,
    #[serde(default = "Ratio::half")]
    pub transpose_ratio: Ratio,
}

impl RandomTransposeHWInit {
    pub fn new<K>(keys: &[K], transpose_ratio: f64) -> Result<Self>
    where
        K: AsRef<str>,
    {
        Ok(Self {
            keys: keys.iter().map(|key| key.as_ref().to_owned()).collect(),
            transpose_ratio: Ratio::try_from(transpose_ratio)?,
        })
    }

    pub fn build(self) -> Result<RandomTransposeHW> {
        let Self {
            keys,
            transpose_ratio,
        } = self;
        ensure_value!(!keys.is_empty(), "keys must not be empty");

        Ok(RandomTransposeHW {
            keys,
            transpose_ratio,
        })
    }
}

/// Swaps the height and width axes of all keys with a shared coin flip.
///
/// Draws one `f64` per call. Writes `transpose`.
#[derive(Debug, Clone)]
pub struct RandomTransposeHW {
    keys: Vec<String>,
    transpose_ratio: Ratio,
}

impl RandomTransposeHW {
    pub fn init(&self) -> RandomTransposeHWInit {
        RandomTransposeHWInit {
            keys: self.keys.clone(),
            transpose_ratio: self.transpose_ratio,
        }
    }

    pub fn forward(&self, sample: &mut Sample, rng: &mut dyn RngCore) -> Result<()> {
        sample.require(&self.keys)?;
        let transpose = self.transpose_ratio.sample(&mut *rng);

        if transpose {
            let outputs: Vec<Value> = self
                .keys
                .iter()
                .map(|key| transpose_value(key, sample.get(key)?))
                .collect::<Result<_>>()?;
            for (key, value) in self.keys.iter().zip(outputs) {
                sample.insert(key.as_str(), value);
            }
        }

        sample.insert("transpose", transpose);
        Ok(())
    }
}

fn transpose_value(key: &str, value: &Value) -> Result<Value> {
    let check = |shape: &[usize]| ops::spatial_size(shape).map(|_| ());

    let output = match value {
        Value::Image(array) => {
            check(array.shape())?;
            Value::Image(ops::transpose_hw(array))
        }
        Value::IntImage(array) => {
            check(array.shape())?;
            Value::IntImage(ops::transpose_hw(array))
        }
        Value::Frames(frames) => Value::Frames(
            frames
                .iter()
                .map(|frame| {
                    check(frame.shape())?;
                    Ok(ops::transpose_hw(frame))
                })
                .collect::<Result<_>>()?,
        ),
        other => {
            return Err(TransformError::Type(format!(
                "cannot transpose {} at key '{}'",
                other.kind(),
                key
            )))
        }
    };
    Ok(output)
}

impl Display for RandomTransposeHW {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RandomTransposeHW(keys={}, transpose_ratio={})",
            KeysRepr(&self.keys),
            self.transpose_ratio
        )
    }
}
