//! Binary asset formats consumed by the platform layer

pub mod mtx;

pub use mtx::*;
