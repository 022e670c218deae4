use crate::common::*;

/// Renders a key list as `['a', 'b']`.
pub struct KeysRepr<'a>(pub &'a [String]);

impl Display for KeysRepr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().map(|key| format!("'{}'", key)).join(", "))
    }
}

/// Renders an optional value, printing `None` when absent.
pub struct OptRepr<'a, T>(pub &'a Option<T>);

impl<T> Display for OptRepr<'_, T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => write!(f, "None"),
        }
    }
}

/// Renders a flat tuple of numbers as `(a, b, …)`.
pub struct TupleRepr<'a>(pub &'a [f64]);

impl Display for TupleRepr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}
