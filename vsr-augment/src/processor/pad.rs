use crate::{
    common::*,
    ops::{self, PadMode},
    sample::{Sample, Value},
    utils::KeysRepr,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PadInit {
    pub keys: Vec<String>,
    #[serde(default = "default_ds_factor")]
    pub ds_factor: usize,
    #[serde(default)]
    pub mode: PadMode,
}

fn default_ds_factor() -> usize {
    32
}

impl PadInit {
    pub fn build(self) -> Result<Pad> {
        let Self {
            keys,
            ds_factor,
            mode,
        } = self;
        ensure_value!(!keys.is_empty(), "keys must not be empty");
        ensure_value!(ds_factor > 0, "ds_factor must be positive");

        Ok(Pad {
            keys,
            ds_factor,
            mode,
        })
    }
}

/// Pads the bottom and right of arrays up to a multiple of `ds_factor`.
///
/// The target size is computed from the first key. `img_shape` is left as is.
#[derive(Debug, Clone)]
pub struct Pad {
    keys: Vec<String>,
    ds_factor: usize,
    mode: PadMode,
}

impl Pad {
    pub fn init(&self) -> PadInit {
        PadInit {
            keys: self.keys.clone(),
            ds_factor: self.ds_factor,
            mode: self.mode,
        }
    }

    /// The smallest multiple of `ds_factor` not less than `len`.
    pub fn padded_len(&self, len: usize) -> usize {
        self.ds_factor * (len.saturating_sub(1) / self.ds_factor + 1)
    }

    pub fn forward(&self, sample: &mut Sample) -> Result<()> {
        sample.require(&self.keys)?;

        let (h, w) = ops::spatial_size(&sample.array_shape(&self.keys[0])?)?;
        ensure_type!(
            h > 0 && w > 0,
            "cannot pad an empty array at key '{}'",
            self.keys[0]
        );
        let (new_h, new_w) = (self.padded_len(h), self.padded_len(w));

        let outputs: Vec<Value> = self
            .keys
            .iter()
            .map(|key| self.pad_value(key, sample.get(key)?, (h, w), (new_h, new_w)))
            .collect::<Result<_>>()?;
        for (key, value) in self.keys.iter().zip(outputs) {
            sample.insert(key.as_str(), value);
        }

        Ok(())
    }

    fn pad_value(
        &self,
        key: &str,
        value: &Value,
        (h, w): (usize, usize),
        (new_h, new_w): (usize, usize),
    ) -> Result<Value> {
        let mode = self.mode;
        let check = |shape: &[usize]| -> Result<()> {
            let size = ops::spatial_size(shape)?;
            ensure_type!(
                size == (h, w),
                "expect spatial size {:?} at key '{}', but get {:?}",
                (h, w),
                key,
                size
            );
            Ok(())
        };
        let (pad_h, pad_w) = (new_h - h, new_w - w);

        let output = match value {
            Value::Image(array) => {
                check(array.shape())?;
                Value::Image(ops::pad_bottom_right(array, pad_h, pad_w, mode))
            }
            Value::IntImage(array) => {
                check(array.shape())?;
                Value::IntImage(ops::pad_bottom_right(array, pad_h, pad_w, mode))
            }
            Value::Frames(frames) => Value::Frames(
                frames
                    .iter()
                    .map(|frame| {
                        check(frame.shape())?;
                        Ok(ops::pad_bottom_right(frame, pad_h, pad_w, mode))
                    })
                    .collect::<Result<_>>()?,
            ),
            other => {
                return Err(TransformError::Type(format!(
                    "cannot pad {} at key '{}'",
                    other.kind(),
                    key
                )))
            }
        };
        Ok(output)
    }
}

impl Display for Pad {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pad(keys={}, ds_factor={}, mode={})",
            KeysRepr(&self.keys),
            self.ds_factor,
            self.mode
        )
    }
}
