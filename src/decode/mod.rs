//! Decoding of raw solver assignments into per-vehicle routes.

mod decoder;

pub use decoder::SolutionDecoder;
