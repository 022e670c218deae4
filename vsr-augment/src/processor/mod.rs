//! Augmentation transforms on [Sample](crate::sample::Sample) records.

pub mod binarize;
pub mod flip;
pub mod mask_dilation;
pub mod pad;
pub mod random_affine;
pub mod random_jitter;
pub mod resize;
pub mod transpose;

pub use binarize::*;
pub use flip::*;
pub use mask_dilation::*;
pub use pad::*;
pub use random_affine::*;
pub use random_jitter::*;
pub use resize::*;
pub use transpose::*;
