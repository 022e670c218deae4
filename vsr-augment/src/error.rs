//! Error types of sample transforms.

use thiserror::Error;

pub type Result<T, E = TransformError> = std::result::Result<T, E>;

/// The error raised by transform construction or application.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A malformed argument, e.g. a range of the wrong arity or
    /// a sample value of an unexpected kind or shape.
    #[error("type error: {0}")]
    Type(String),
    /// An argument out of its domain.
    #[error("value error: {0}")]
    Value(String),
    /// A key required by a transform is absent from the sample.
    #[error("lookup error: key '{0}' is not found in the sample")]
    Lookup(String),
    /// A failure of the transform at `index` within a pipeline.
    #[error("transform #{index} ({name}) failed")]
    Pipeline {
        index: usize,
        name: &'static str,
        #[source]
        source: Box<TransformError>,
    },
}

impl TransformError {
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    pub fn value_error(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }

    /// The innermost error, skipping pipeline positions.
    pub fn root(&self) -> &TransformError {
        match self {
            Self::Pipeline { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self.root(), Self::Type(_))
    }

    pub fn is_value_error(&self) -> bool {
        matches!(self.root(), Self::Value(_))
    }

    pub fn is_lookup_error(&self) -> bool {
        matches!(self.root(), Self::Lookup(_))
    }
}

/// Returns early with a value error unless the condition holds.
macro_rules! ensure_value {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::TransformError::Value(format!($($arg)+)));
        }
    };
}

/// Returns early with a type error unless the condition holds.
macro_rules! ensure_type {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::TransformError::Type(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_type;
pub(crate) use ensure_value;
