//! Core definitions (element type tags, errors and small helpers), relied upon
//! by all vectorize-* crates.

pub mod dtype;
pub mod error;
pub mod index;
pub mod result;

pub use dtype::{Dtype, DtypeCode};
pub use result::Result;
