pub use anyhow::{Context as _, Result as AnyResult};
pub use approx::AbsDiffEq;
pub use indexmap::IndexMap;
pub use itertools::Itertools as _;
pub use log::{debug, info};
pub use ndarray::{Array2, Array3, ArrayD, ArrayView3, Axis, Dimension, Ix3, IxDyn};
pub use noisy_float::prelude::*;
pub use num_traits::Zero;
pub use rand::{prelude::*, RngCore};
pub use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    convert::TryFrom,
    f64::consts::PI,
    fmt::{self, Debug, Display, Formatter},
    path::Path,
};

pub use crate::error::{Result, TransformError};
pub(crate) use crate::error::{ensure_type, ensure_value};
