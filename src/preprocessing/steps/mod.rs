//! Individual preparation steps

pub mod normalize;
pub mod pad;
pub mod resize;
pub mod scale;
