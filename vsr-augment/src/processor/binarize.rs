//! Mask thresholding.

use crate::{
    common::*,
    ops,
    sample::{Sample, Value},
    utils::KeysRepr,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinarizeImageInit {
    pub keys: Vec<String>,
    pub binary_thr: R64,
    #[serde(default)]
    pub to_int: bool,
}

impl BinarizeImageInit {
    pub fn build(self) -> Result<BinarizeImage> {
        let Self {
            keys,
            binary_thr,
            to_int,
        } = self;
        ensure_value!(!keys.is_empty(), "keys must not be empty");

        Ok(BinarizeImage {
            keys,
            binary_thr,
            to_int,
        })
    }
}

/// Thresholds masks to `{0, 1}`, optionally as integers.
#[derive(Debug, Clone)]
pub struct BinarizeImage {
    keys: Vec<String>,
    binary_thr: R64,
    to_int: bool,
}

impl BinarizeImage {
    pub fn init(&self) -> BinarizeImageInit {
        BinarizeImageInit {
            keys: self.keys.clone(),
            binary_thr: self.binary_thr,
            to_int: self.to_int,
        }
    }

    pub fn forward(&self, sample: &mut Sample) -> Result<()> {
        sample.require(&self.keys)?;
        let threshold = self.binary_thr.raw() as f32;

        let outputs: Vec<Value> = self
            .keys
            .iter()
            .map(|key| -> Result<Value> {
                let image = sample.image(key)?;
                let binary = if self.to_int {
                    Value::IntImage(ops::binarize(image, threshold))
                } else {
                    Value::Image(ops::binarize(image, threshold))
                };
                Ok(binary)
            })
            .collect::<Result<_>>()?;

        for (key, binary) in self.keys.iter().zip(outputs) {
            sample.insert(key.as_str(), binary);
        }

        Ok(())
    }
}

impl Display for BinarizeImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BinarizeImage(keys={}, binary_thr={}, to_int={})",
            KeysRepr(&self.keys),
            self.binary_thr,
            self.to_int
        )
    }
}
