//! Core data primitives.

mod matrix;

pub use matrix::Matrix;
