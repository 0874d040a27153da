//! Aligned byte storage for buffers produced by the vectorize infrastructure and
//! handed over to a host runtime.

pub mod buffer;

pub use buffer::{AlignedByteVec, AllocationError};
