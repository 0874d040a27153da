//! Typed access to externally owned, strided arrays and the owned arrays
//! produced for a host runtime.
//!
//! # Main Components
//!
//! - [`scalar::Scalar`]: the closed set of element types, each bound to its
//!   runtime [`Dtype`] tag.
//! - [`view::ArrayView`]: a borrowed, read-only descriptor over a foreign buffer
//!   (shape, strides, element type tag, data).
//! - [`validate::validate`]: shape and element type compatibility of a group of
//!   inputs against the tags expected for each argument position.
//! - [`marshal::ArgTuple`]: reconstructs a typed argument tuple from the i-th
//!   element of every input.
//! - [`output::OwnedArray`]: an exclusively owned output buffer with a release
//!   action that runs exactly once.
//! - [`dlpack`]: the DLPack ABI used to exchange arrays with a host runtime.

pub mod dlpack;
pub mod layout;
pub mod marshal;
pub mod output;
pub mod scalar;
pub mod validate;
pub mod view;

pub use marshal::ArgTuple;
pub use output::{OutputOptions, OwnedArray, ReleaseHook};
pub use scalar::Scalar;
pub use validate::validate;
pub use view::ArrayView;
pub use vectorize_common::{Dtype, DtypeCode};
