//! # Vectorize: element-wise application of scalar methods to arrays
//!
//! This crate turns a method that takes one to four scalar arguments into an
//! adapter that takes the same number of arrays, applies the method to every
//! element in lockstep, and returns a freshly allocated array of the results.
//!
//! ```
//! use vectorize::{ArrayView, vectorize2};
//!
//! struct Mixer {
//!     weight: f32,
//! }
//!
//! let mix = vectorize2(|m: &Mixer, a: f32, b: f32| a * m.weight + b);
//! let a = [1.0f32, 2.0, 3.0, 4.0];
//! let b = [0.5f32; 4];
//! let a = ArrayView::from_slice(&a, &[2, 2]).unwrap();
//! let b = ArrayView::from_slice(&b, &[2, 2]).unwrap();
//!
//! let out = mix(&Mixer { weight: 2.0 }, &a, &b).unwrap();
//! assert_eq!(out.shape(), &[2, 2]);
//! assert_eq!(out.to_vec::<f32>().unwrap(), vec![2.5, 4.5, 6.5, 8.5]);
//! ```
//!
//! ## Call sequence
//!
//! An adapter call proceeds in a fixed order, and nothing of the output is
//! observable unless every step succeeds:
//!
//! 1. the inputs are validated: all of them must share the shape of the first
//!    one, and each must carry the element type tag of its argument type;
//! 2. an output array shaped like the first input is allocated;
//! 3. the method is applied to the elements in ascending row-major order;
//! 4. the output is returned to the caller, who owns it from then on.
//!
//! ## Module Organization
//!
//! * [`adapter`] - The `vectorizeN` and `try_vectorizeN` factories
//! * [`dispatch`] - The element-wise loop behind every adapter
//! * [`options`] - Output allocation settings
//! * [`array`] - Array views, owned outputs and the DLPack boundary
//! * [`common`] - Element type tags and errors

pub mod adapter;
pub mod dispatch;
pub mod options;

pub use vectorize_array as array;
pub use vectorize_common as common;

pub use adapter::{
    try_vectorize1, try_vectorize1_with, try_vectorize2, try_vectorize2_with, try_vectorize3,
    try_vectorize3_with, try_vectorize4, try_vectorize4_with, vectorize1, vectorize1_with,
    vectorize2, vectorize2_with, vectorize3, vectorize3_with, vectorize4, vectorize4_with,
};
pub use dispatch::dispatch;
pub use options::VectorizeOptions;
pub use vectorize_array::{ArgTuple, ArrayView, OutputOptions, OwnedArray, Scalar};
pub use vectorize_common::{
    Dtype, DtypeCode, Result,
    error::{Error, ErrorKind},
};
