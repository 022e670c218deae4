use crate::{
    common::*,
    ops,
    sample::{Sample, Value},
    utils::KeysRepr,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RandomMaskDilationInit {
    pub keys: Vec<String>,
    #[serde(default = "default_binary_thr")]
    pub binary_thr: R64,
    #[serde(default = "default_kernel_min")]
    pub kernel_min: usize,
    #[serde(default = "default_kernel_max")]
    pub kernel_max: usize,
}

fn default_binary_thr() -> R64 {
    r64(0.0)
}

fn default_kernel_min() -> usize {
    9
}

fn default_kernel_max() -> usize {
    49
}

impl RandomMaskDilationInit {
    pub fn new<K>(keys: &[K], kernel_min: usize, kernel_max: usize) -> Self
    where
        K: AsRef<str>,
    {
        Self {
            keys: keys.iter().map(|key| key.as_ref().to_owned()).collect(),
            binary_thr: default_binary_thr(),
            kernel_min,
            kernel_max,
        }
    }

    pub fn build(self) -> Result<RandomMaskDilation> {
        let Self {
            keys,
            binary_thr,
            kernel_min,
            kernel_max,
        } = self;

        ensure_value!(!keys.is_empty(), "keys must not be empty");
        ensure_value!(
            kernel_min >= 1 && kernel_min <= kernel_max,
            "expect 1 <= kernel_min <= kernel_max, but get kernel_min={} and kernel_max={}",
            kernel_min,
            kernel_max
        );

        let kernel_sizes: Vec<usize> = (kernel_min..=kernel_max).filter(|size| size % 2 == 1).collect();
        ensure_value!(
            !kernel_sizes.is_empty(),
            "no odd kernel size within [{}, {}]",
            kernel_min,
            kernel_max
        );

        Ok(RandomMaskDilation {
            keys,
            binary_thr,
            kernel_min,
            kernel_max,
            kernel_sizes,
        })
    }
}

/// Binarizes and dilates masks with a randomly sized odd square kernel.
///
/// Each key draws its own kernel size and records it at
/// `<key>_dilate_kernel_size`.
#[derive(Debug, Clone)]
pub struct RandomMaskDilation {
    keys: Vec<String>,
    binary_thr: R64,
    kernel_min: usize,
    kernel_max: usize,
    kernel_sizes: Vec<usize>,
}

impl RandomMaskDilation {
    pub fn init(&self) -> RandomMaskDilationInit {
        RandomMaskDilationInit {
            keys: self.keys.clone(),
            binary_thr: self.binary_thr,
            kernel_min: self.kernel_min,
            kernel_max: self.kernel_max,
        }
    }

    /// The odd kernel sizes drawn from.
    pub fn kernel_sizes(&self) -> &[usize] {
        &self.kernel_sizes
    }

    pub fn forward(&self, sample: &mut Sample, rng: &mut dyn RngCore) -> Result<()> {
        sample.require(&self.keys)?;

        let mut outputs = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            let mask = sample.image(key)?;
            let binary: ArrayD<f32> = ops::binarize(mask, self.binary_thr.raw() as f32);
            let binary = ops::as_hwc(&binary)?;

            let kernel_size = self.kernel_sizes[rng.gen_range(0..self.kernel_sizes.len())];
            debug!("dilate mask '{}' with kernel size {}", key, kernel_size);

            outputs.push((key, ops::dilate(binary, kernel_size), kernel_size));
        }

        for (key, dilated, kernel_size) in outputs {
            sample.insert(key.as_str(), Value::Image(dilated.into_dyn()));
            sample.insert(format!("{}_dilate_kernel_size", key), kernel_size as i64);
        }

        Ok(())
    }
}

impl Display for RandomMaskDilation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RandomMaskDilation(keys={}, kernel_min={}, kernel_max={})",
            KeysRepr(&self.keys),
            self.kernel_min,
            self.kernel_max
        )
    }
}
