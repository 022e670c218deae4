use crate::common::*;

/// A numeric range argument given either as a single bound or as
/// a flat sequence of bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeArg {
    Scalar(R64),
    Seq(Vec<R64>),
}

impl RangeArg {
    /// Resolves to a single `(lo, hi)` range.
    ///
    /// A scalar `value` must be non-negative and means `(-value, value)`.
    pub fn to_symmetric_range(&self, name: &str) -> Result<(f64, f64)> {
        match self {
            RangeArg::Scalar(value) => {
                ensure_value!(*value >= 0.0, "{} must be non-negative, but get {}", name, value);
                Ok((-value.raw(), value.raw()))
            }
            RangeArg::Seq(values) => {
                ensure_type!(
                    values.len() == 2,
                    "{} must be a number or a sequence of 2 numbers, but get {} numbers",
                    name,
                    values.len()
                );
                ordered_pair(name, values[0], values[1])
            }
        }
    }

    /// Resolves to one range per axis, accepting a scalar,
    /// a pair for the first axis or four bounds for two axes.
    pub fn to_axis_ranges(&self, name: &str) -> Result<Vec<(f64, f64)>> {
        match self {
            RangeArg::Scalar(_) => Ok(vec![self.to_symmetric_range(name)?]),
            RangeArg::Seq(values) => match values.as_slice() {
                &[lo, hi] => Ok(vec![ordered_pair(name, lo, hi)?]),
                &[x_lo, x_hi, y_lo, y_hi] => Ok(vec![
                    ordered_pair(name, x_lo, x_hi)?,
                    ordered_pair(name, y_lo, y_hi)?,
                ]),
                _ => Err(TransformError::Type(format!(
                    "{} must be a number or a sequence of 2 or 4 numbers, but get {} numbers",
                    name,
                    values.len()
                ))),
            },
        }
    }
}

impl From<f64> for RangeArg {
    fn from(value: f64) -> Self {
        RangeArg::Scalar(r64(value))
    }
}

impl From<(f64, f64)> for RangeArg {
    fn from((lo, hi): (f64, f64)) -> Self {
        RangeArg::Seq(vec![r64(lo), r64(hi)])
    }
}

impl From<Vec<f64>> for RangeArg {
    fn from(values: Vec<f64>) -> Self {
        RangeArg::Seq(values.into_iter().map(r64).collect())
    }
}

impl From<[f64; 4]> for RangeArg {
    fn from(values: [f64; 4]) -> Self {
        RangeArg::Seq(values.into_iter().map(r64).collect())
    }
}

/// Checks a 2-element sequence argument and returns it as a pair.
pub fn exact_pair(name: &str, values: &[R64]) -> Result<(f64, f64)> {
    match *values {
        [a, b] => Ok((a.raw(), b.raw())),
        _ => Err(TransformError::Type(format!(
            "{} must be a sequence of 2 numbers, but get {} numbers",
            name,
            values.len()
        ))),
    }
}

fn ordered_pair(name: &str, lo: R64, hi: R64) -> Result<(f64, f64)> {
    ensure_value!(
        lo <= hi,
        "{} lower bound {} must not exceed upper bound {}",
        name,
        lo,
        hi
    );
    Ok((lo.raw(), hi.raw()))
}

/// Draws a value within `[lo, hi)`, consuming exactly one draw even for an
/// empty range.
pub fn uniform<R>(rng: &mut R, lo: f64, hi: f64) -> f64
where
    R: Rng + ?Sized,
{
    let unit: f64 = rng.gen();
    lo + (hi - lo) * unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_range() {
        assert_eq!(RangeArg::from(30.0).to_symmetric_range("degrees").unwrap(), (-30.0, 30.0));
        assert_eq!(
            RangeArg::from((-10.0, 20.0)).to_symmetric_range("degrees").unwrap(),
            (-10.0, 20.0)
        );
        assert!(RangeArg::from(-1.0)
            .to_symmetric_range("degrees")
            .unwrap_err()
            .is_value_error());
        assert!(RangeArg::from(vec![0.0, 1.0, 2.0])
            .to_symmetric_range("degrees")
            .unwrap_err()
            .is_type_error());
        assert!(RangeArg::from((2.0, 1.0))
            .to_symmetric_range("degrees")
            .unwrap_err()
            .is_value_error());
    }

    #[test]
    fn axis_ranges() {
        assert_eq!(
            RangeArg::from([0.0, 1.0, -2.0, 2.0]).to_axis_ranges("shear").unwrap(),
            vec![(0.0, 1.0), (-2.0, 2.0)]
        );
        assert!(RangeArg::from(vec![0.0, 1.0, 2.0])
            .to_axis_ranges("shear")
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn range_arg_from_json() {
        let scalar: RangeArg = serde_json::from_str("40").unwrap();
        assert_eq!(scalar, RangeArg::from(40.0));
        let seq: RangeArg = serde_json::from_str("[-50, 50]").unwrap();
        assert_eq!(seq, RangeArg::from((-50.0, 50.0)));
    }

    #[test]
    fn uniform_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..1000).all(|_| {
            let value = uniform(&mut rng, -2.0, 3.0);
            (-2.0..3.0).contains(&value)
        }));
        assert_eq!(uniform(&mut rng, 1.5, 1.5), 1.5);
    }
}
