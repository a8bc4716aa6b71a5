//! Distance matrices.
//!
//! Provides a dense, possibly asymmetric distance matrix. Travel times are
//! derived from it by the problem instance (distance divided by speed).

mod matrix;

pub use matrix::DistanceMatrix;
