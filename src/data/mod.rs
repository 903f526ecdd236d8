//! Data sources beyond files: synthetic observation / model pairs.

pub mod sample;

pub use sample::*;
