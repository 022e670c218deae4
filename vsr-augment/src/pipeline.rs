//! Ordered composition of transforms and its configuration format.

use crate::{common::*, processor::*, sample::Sample};

/// The common interface of all transforms.
pub trait Transform
where
    Self: Debug + Display + Send + Sync,
{
    /// The transform name used in configuration files.
    fn name(&self) -> &'static str;

    fn apply(&self, sample: &mut Sample, rng: &mut dyn RngCore) -> Result<()>;

    /// The normalized configuration the transform is built from.
    fn to_init(&self) -> TransformInit;
}

macro_rules! impl_transform {
    ($ty:ident, |$this:ident, $sample:ident, $rng:ident| $body:expr) => {
        impl Transform for $ty {
            fn name(&self) -> &'static str {
                stringify!($ty)
            }

            fn apply(&self, $sample: &mut Sample, $rng: &mut dyn RngCore) -> Result<()> {
                let $this = self;
                $body
            }

            fn to_init(&self) -> TransformInit {
                TransformInit::$ty(self.init())
            }
        }
    };
}

impl_transform!(Resize, |this, sample, _rng| this.forward(sample));
impl_transform!(Pad, |this, sample, _rng| this.forward(sample));
impl_transform!(Flip, |this, sample, rng| this.forward(sample, rng));
impl_transform!(RandomTransposeHW, |this, sample, rng| this.forward(sample, rng));
impl_transform!(RandomAffine, |this, sample, rng| this.forward(sample, rng));
impl_transform!(RandomJitter, |this, sample, rng| this.forward(sample, rng));
impl_transform!(RandomMaskDilation, |this, sample, rng| this.forward(sample, rng));
impl_transform!(BinarizeImage, |this, sample, _rng| this.forward(sample));

/// The configuration of one transform, tagged by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransformInit {
    Resize(ResizeInit),
    Pad(PadInit),
    Flip(FlipInit),
    RandomTransposeHW(RandomTransposeHWInit),
    RandomAffine(RandomAffineInit),
    RandomJitter(RandomJitterInit),
    RandomMaskDilation(RandomMaskDilationInit),
    BinarizeImage(BinarizeImageInit),
}

impl TransformInit {
    pub fn build(self) -> Result<Box<dyn Transform>> {
        let transform: Box<dyn Transform> = match self {
            Self::Resize(init) => Box::new(init.build()?),
            Self::Pad(init) => Box::new(init.build()?),
            Self::Flip(init) => Box::new(init.build()?),
            Self::RandomTransposeHW(init) => Box::new(init.build()?),
            Self::RandomAffine(init) => Box::new(init.build()?),
            Self::RandomJitter(init) => Box::new(init.build()?),
            Self::RandomMaskDilation(init) => Box::new(init.build()?),
            Self::BinarizeImage(init) => Box::new(init.build()?),
        };
        Ok(transform)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize(_) => "Resize",
            Self::Pad(_) => "Pad",
            Self::Flip(_) => "Flip",
            Self::RandomTransposeHW(_) => "RandomTransposeHW",
            Self::RandomAffine(_) => "RandomAffine",
            Self::RandomJitter(_) => "RandomJitter",
            Self::RandomMaskDilation(_) => "RandomMaskDilation",
            Self::BinarizeImage(_) => "BinarizeImage",
        }
    }
}

/// The pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInit {
    pub transforms: Vec<TransformInit>,
}

impl PipelineInit {
    /// Loads a JSON5 pipeline configuration file.
    pub fn open<P>(path: P) -> AnyResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let init = json5::from_str(&text)
            .with_context(|| format!("failed to parse '{}'", path.display()))?;
        Ok(init)
    }

    /// Builds all transforms, failing on the first invalid one.
    pub fn build(self) -> Result<Pipeline> {
        let transforms: Vec<_> = self
            .transforms
            .into_iter()
            .enumerate()
            .map(|(index, init)| {
                let name = init.name();
                init.build().map_err(|err| TransformError::Pipeline {
                    index,
                    name,
                    source: Box::new(err),
                })
            })
            .collect::<Result<_>>()?;

        info!(
            "built pipeline with {} transforms: {}",
            transforms.len(),
            transforms.iter().map(|transform| transform.name()).join(" -> ")
        );

        Ok(Pipeline { transforms })
    }
}

/// The ordered list of transforms applied to each sample.
#[derive(Debug)]
pub struct Pipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn transforms(&self) -> &[Box<dyn Transform>] {
        &self.transforms
    }

    pub fn init(&self) -> PipelineInit {
        PipelineInit {
            transforms: self
                .transforms
                .iter()
                .map(|transform| transform.to_init())
                .collect(),
        }
    }

    /// Runs the transforms in order, stopping at the first failure.
    pub fn apply(&self, sample: &mut Sample, rng: &mut dyn RngCore) -> Result<()> {
        self.transforms
            .iter()
            .enumerate()
            .try_for_each(|(index, transform)| {
                transform
                    .apply(sample, &mut *rng)
                    .map_err(|err| TransformError::Pipeline {
                        index,
                        name: transform.name(),
                        source: Box::new(err),
                    })
            })
    }
}

impl FromIterator<Box<dyn Transform>> for Pipeline {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Box<dyn Transform>>,
    {
        Self {
            transforms: iter.into_iter().collect(),
        }
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline(")?;
        for transform in &self.transforms {
            writeln!(f, "    {},", transform)?;
        }
        write!(f, ")")
    }
}
