//! The keyed record flowing through a pipeline.

use crate::common::*;

/// A value stored in a [Sample].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    /// A float image in `H×W` or `H×W×C` layout.
    Image(ArrayD<f32>),
    /// An integer image in `H×W` or `H×W×C` layout.
    IntImage(ArrayD<i32>),
    /// A sequence of float images sharing one transform decision.
    Frames(Vec<ArrayD<f32>>),
    Shape(Vec<usize>),
    Bool(bool),
    Int(i64),
    Float(f64),
    Floats(Vec<f64>),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Image(_) => "image",
            Value::IntImage(_) => "int image",
            Value::Frames(_) => "frames",
            Value::Shape(_) => "shape",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Floats(_) => "floats",
            Value::Str(_) => "string",
        }
    }

    /// The shape of an array value. Frames report the shape of the first frame.
    pub fn array_shape(&self) -> Option<&[usize]> {
        match self {
            Value::Image(array) => Some(array.shape()),
            Value::IntImage(array) => Some(array.shape()),
            Value::Frames(frames) => frames.first().map(|frame| frame.shape()),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Image(_) | Value::IntImage(_) | Value::Frames(_))
    }
}

impl From<ArrayD<f32>> for Value {
    fn from(array: ArrayD<f32>) -> Self {
        Value::Image(array)
    }
}

impl From<Array2<f32>> for Value {
    fn from(array: Array2<f32>) -> Self {
        Value::Image(array.into_dyn())
    }
}

impl From<Array3<f32>> for Value {
    fn from(array: Array3<f32>) -> Self {
        Value::Image(array.into_dyn())
    }
}

impl From<ArrayD<i32>> for Value {
    fn from(array: ArrayD<i32>) -> Self {
        Value::IntImage(array)
    }
}

impl From<Vec<ArrayD<f32>>> for Value {
    fn from(frames: Vec<ArrayD<f32>>) -> Self {
        Value::Frames(frames)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

/// The mutable record of arrays and metadata.
///
/// Accessors fail with [TransformError::Lookup] when the key is absent
/// and with [TransformError::Type] when the value is of another kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample {
    entries: IndexMap<String, Value>,
}

impl Sample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(key, value);
        self
    }

    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.entries.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Result<&Value> {
        self.entries
            .get(key)
            .ok_or_else(|| TransformError::Lookup(key.to_owned()))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value> {
        self.entries
            .get_mut(key)
            .ok_or_else(|| TransformError::Lookup(key.to_owned()))
    }

    /// Checks that every key is present.
    pub fn require<S>(&self, keys: &[S]) -> Result<()>
    where
        S: AsRef<str>,
    {
        keys.iter().try_for_each(|key| self.get(key.as_ref()).map(|_| ()))
    }

    pub fn image(&self, key: &str) -> Result<&ArrayD<f32>> {
        match self.get(key)? {
            Value::Image(array) => Ok(array),
            other => Err(mismatch(key, "image", other)),
        }
    }

    pub fn image_mut(&mut self, key: &str) -> Result<&mut ArrayD<f32>> {
        match self.get_mut(key)? {
            Value::Image(array) => Ok(array),
            other => Err(mismatch(key, "image", other)),
        }
    }

    /// Removes and returns the float image at `key`. Other values are kept.
    pub fn take_image(&mut self, key: &str) -> Result<ArrayD<f32>> {
        self.image(key)?;
        match self.entries.shift_remove(key) {
            Some(Value::Image(array)) => Ok(array),
            _ => Err(TransformError::Lookup(key.to_owned())),
        }
    }

    pub fn int_image(&self, key: &str) -> Result<&ArrayD<i32>> {
        match self.get(key)? {
            Value::IntImage(array) => Ok(array),
            other => Err(mismatch(key, "int image", other)),
        }
    }

    pub fn frames(&self, key: &str) -> Result<&[ArrayD<f32>]> {
        match self.get(key)? {
            Value::Frames(frames) => Ok(frames),
            other => Err(mismatch(key, "frames", other)),
        }
    }

    /// The shape of the array value at `key`.
    pub fn array_shape(&self, key: &str) -> Result<Vec<usize>> {
        let value = self.get(key)?;
        value
            .array_shape()
            .map(|shape| shape.to_vec())
            .ok_or_else(|| mismatch(key, "array", value))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match *self.get(key)? {
            Value::Bool(value) => Ok(value),
            ref other => Err(mismatch(key, "bool", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        match *self.get(key)? {
            Value::Int(value) => Ok(value),
            ref other => Err(mismatch(key, "int", other)),
        }
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        match *self.get(key)? {
            Value::Float(value) => Ok(value),
            ref other => Err(mismatch(key, "float", other)),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.get(key)? {
            Value::Str(value) => Ok(value),
            other => Err(mismatch(key, "string", other)),
        }
    }

    pub fn get_shape(&self, key: &str) -> Result<&[usize]> {
        match self.get(key)? {
            Value::Shape(value) => Ok(value),
            other => Err(mismatch(key, "shape", other)),
        }
    }
}

fn mismatch(key: &str, expect: &str, found: &Value) -> TransformError {
    TransformError::Type(format!(
        "expect {} at key '{}', but get {}",
        expect,
        key,
        found.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_accessors() {
        let sample = Sample::new()
            .with("img", Array3::<f32>::zeros((2, 3, 1)))
            .with("flip", true)
            .with("gt_path", "fake_gt_path");

        assert_eq!(sample.len(), 3);
        assert_eq!(sample.image("img").unwrap().shape(), &[2, 3, 1]);
        assert_eq!(sample.array_shape("img").unwrap(), vec![2, 3, 1]);
        assert!(sample.get_bool("flip").unwrap());
        assert_eq!(sample.get_str("gt_path").unwrap(), "fake_gt_path");

        assert!(sample.image("missing").unwrap_err().is_lookup_error());
        assert!(sample.image("flip").unwrap_err().is_type_error());
        assert!(sample.array_shape("gt_path").unwrap_err().is_type_error());
        assert!(sample.require(&["img", "gt_path"]).is_ok());
        assert!(sample.require(&["img", "lq"]).unwrap_err().is_lookup_error());
    }

    #[test]
    fn take_image_keeps_other_kinds() {
        let mut sample = Sample::new()
            .with("img", Array2::<f32>::ones((2, 2)))
            .with("flip", false);

        assert!(sample.take_image("flip").unwrap_err().is_type_error());
        assert!(sample.contains_key("flip"));
        assert_eq!(sample.take_image("img").unwrap().shape(), &[2, 2]);
        assert!(!sample.contains_key("img"));
    }

    #[test]
    fn sample_keeps_insertion_order() {
        let sample = Sample::new()
            .with("b", 1i64)
            .with("a", 2i64)
            .with("c", 3i64);
        let keys: Vec<_> = sample.keys().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }
}
