use crate::common::*;

/// A probability within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ratio(R64);

impl Ratio {
    pub fn zero() -> Self {
        Self(r64(0.0))
    }

    pub fn one() -> Self {
        Self(r64(1.0))
    }

    pub fn half() -> Self {
        Self(r64(0.5))
    }

    pub fn to_r64(&self) -> R64 {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.raw()
    }

    /// Draws one `f64` from `rng` and tells whether it falls below the ratio.
    pub fn sample<R>(&self, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        rng.gen::<f64>() < self.to_f64()
    }
}

impl Serialize for Ratio {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::try_from(value).map_err(|err| D::Error::custom(format!("{}", err)))
    }
}

impl AbsDiffEq<f64> for Ratio {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &f64, epsilon: Self::Epsilon) -> bool {
        self.0.raw().abs_diff_eq(other, epsilon)
    }
}

impl TryFrom<R64> for Ratio {
    type Error = TransformError;

    fn try_from(value: R64) -> Result<Self, Self::Error> {
        ensure_value!(
            (0.0..=1.0).contains(&value.raw()),
            "ratio value must be within range [0.0, 1.0], but get {}",
            value
        );
        Ok(Self(value))
    }
}

impl TryFrom<f64> for Ratio {
    type Error = TransformError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let value = R64::try_new(value)
            .ok_or_else(|| TransformError::value_error("ratio must be a finite value"))?;
        Self::try_from(value)
    }
}

impl From<Ratio> for R64 {
    fn from(ratio: Ratio) -> Self {
        ratio.0
    }
}

impl From<Ratio> for f64 {
    fn from(ratio: Ratio) -> Self {
        ratio.0.raw()
    }
}

impl PartialEq<f64> for Ratio {
    fn eq(&self, rhs: &f64) -> bool {
        self.0.raw().eq(rhs)
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.to_f64(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_bounds() {
        assert!(Ratio::try_from(0.0).is_ok());
        assert!(Ratio::try_from(1.0).is_ok());
        assert!(Ratio::try_from(-0.1).unwrap_err().is_value_error());
        assert!(Ratio::try_from(1.5).unwrap_err().is_value_error());
        assert!(Ratio::try_from(f64::NAN).unwrap_err().is_value_error());
    }

    #[test]
    fn ratio_sample_extremes() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!((0..100).all(|_| Ratio::one().sample(&mut rng)));
        assert!((0..100).all(|_| !Ratio::zero().sample(&mut rng)));
    }

    #[test]
    fn ratio_eq_agrees_with_hash() {
        use std::collections::HashSet;

        let half = Ratio::try_from(0.5).unwrap();
        assert_eq!(half, Ratio::try_from(0.5).unwrap());
        assert_ne!(half, Ratio::one());
        assert_eq!(half, 0.5);

        let set: HashSet<Ratio> = [half, Ratio::try_from(0.5).unwrap(), Ratio::one()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn ratio_deserialize() {
        let ratio: Ratio = serde_json::from_str("0.25").unwrap();
        assert_eq!(ratio, 0.25);
        assert!(serde_json::from_str::<Ratio>("2.0").is_err());
    }
}
