//! Adapter factories.
//!
//! Each factory turns a scalar method of some type `C` into an adapter with
//! the calling convention `adapter(&instance, &a1, ..., &aN)`, which applies
//! the method element-wise to `N` arrays and returns a new array.
//!
//! Factories exist for one to four arguments:
//!
//! - `vectorizeN` for infallible methods returning a [`Scalar`];
//! - `try_vectorizeN` for methods returning `Result<R, E>`, whose first error
//!   aborts the call and is reported as [`ErrorKind::Method`];
//! - `*_with` variants of both, taking [`VectorizeOptions`].
//!
//! Methods of other arities, or with non-scalar argument or return types, are
//! rejected at compile time:
//!
//! ```compile_fail
//! struct Sum;
//!
//! fn sum5(_: &Sum, a: f64, b: f64, c: f64, d: f64, e: f64) -> f64 {
//!     a + b + c + d + e
//! }
//!
//! let _ = vectorize::vectorize4(sum5);
//! ```
//!
//! ```compile_fail
//! struct Label;
//!
//! let _ = vectorize::vectorize1(|_: &Label, x: f64| x.to_string());
//! ```
//!
//! [`ErrorKind::Method`]: vectorize_common::error::ErrorKind::Method

use std::convert::Infallible;

use vectorize_array::{ArrayView, OwnedArray, Scalar};
use vectorize_common::{Result, error::Error};

use crate::{dispatch::dispatch, options::VectorizeOptions};

/// Vectorizes a method of one argument.
///
/// ```
/// use vectorize::{ArrayView, vectorize1};
///
/// struct Scale(f64);
///
/// let scale = vectorize1(|s: &Scale, x: f64| s.0 * x);
/// let data = [1.0, 2.0, 3.0];
/// let out = scale(&Scale(10.0), &ArrayView::from_vec_slice(&data)).unwrap();
/// assert_eq!(out.to_vec::<f64>().unwrap(), vec![10.0, 20.0, 30.0]);
/// ```
pub fn vectorize1<C, A, R>(
    method: impl Fn(&C, A) -> R,
) -> impl Fn(&C, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    R: Scalar,
{
    vectorize1_with(method, VectorizeOptions::default())
}

pub fn vectorize1_with<C, A, R>(
    method: impl Fn(&C, A) -> R,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    R: Scalar,
{
    try_vectorize1_with(
        move |instance: &C, a| Ok::<_, Infallible>(method(instance, a)),
        options,
    )
}

/// Vectorizes a fallible method of one argument.
pub fn try_vectorize1<C, A, R, E>(
    method: impl Fn(&C, A) -> std::result::Result<R, E>,
) -> impl Fn(&C, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    try_vectorize1_with(method, VectorizeOptions::default())
}

pub fn try_vectorize1_with<C, A, R, E>(
    method: impl Fn(&C, A) -> std::result::Result<R, E>,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    move |instance: &C, a: &ArrayView<'_>| {
        dispatch::<(A,), R, _>(&[a], &options, |(a,)| {
            method(instance, a).map_err(Error::method)
        })
    }
}

/// Vectorizes a method of two arguments.
///
/// ```
/// use vectorize::{ArrayView, vectorize2};
///
/// struct Calc;
///
/// impl Calc {
///     fn combine(&self, a: f64, b: f64) -> f64 {
///         a + b
///     }
/// }
///
/// let combine = vectorize2(Calc::combine);
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let b = [10.0, 20.0, 30.0, 40.0, 50.0];
/// let out = combine(
///     &Calc,
///     &ArrayView::from_vec_slice(&a),
///     &ArrayView::from_vec_slice(&b),
/// )
/// .unwrap();
/// assert_eq!(out.to_vec::<f64>().unwrap(), vec![11.0, 22.0, 33.0, 44.0, 55.0]);
/// ```
pub fn vectorize2<C, A, B, R>(
    method: impl Fn(&C, A, B) -> R,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    R: Scalar,
{
    vectorize2_with(method, VectorizeOptions::default())
}

pub fn vectorize2_with<C, A, B, R>(
    method: impl Fn(&C, A, B) -> R,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    R: Scalar,
{
    try_vectorize2_with(
        move |instance: &C, a, b| Ok::<_, Infallible>(method(instance, a, b)),
        options,
    )
}

/// Vectorizes a fallible method of two arguments.
pub fn try_vectorize2<C, A, B, R, E>(
    method: impl Fn(&C, A, B) -> std::result::Result<R, E>,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    try_vectorize2_with(method, VectorizeOptions::default())
}

pub fn try_vectorize2_with<C, A, B, R, E>(
    method: impl Fn(&C, A, B) -> std::result::Result<R, E>,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    move |instance: &C, a: &ArrayView<'_>, b: &ArrayView<'_>| {
        dispatch::<(A, B), R, _>(&[a, b], &options, |(a, b)| {
            method(instance, a, b).map_err(Error::method)
        })
    }
}

/// Vectorizes a method of three arguments.
pub fn vectorize3<C, A, B, D, R>(
    method: impl Fn(&C, A, B, D) -> R,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    R: Scalar,
{
    vectorize3_with(method, VectorizeOptions::default())
}

pub fn vectorize3_with<C, A, B, D, R>(
    method: impl Fn(&C, A, B, D) -> R,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    R: Scalar,
{
    try_vectorize3_with(
        move |instance: &C, a, b, d| Ok::<_, Infallible>(method(instance, a, b, d)),
        options,
    )
}

/// Vectorizes a fallible method of three arguments.
pub fn try_vectorize3<C, A, B, D, R, E>(
    method: impl Fn(&C, A, B, D) -> std::result::Result<R, E>,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    try_vectorize3_with(method, VectorizeOptions::default())
}

pub fn try_vectorize3_with<C, A, B, D, R, E>(
    method: impl Fn(&C, A, B, D) -> std::result::Result<R, E>,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    move |instance: &C, a: &ArrayView<'_>, b: &ArrayView<'_>, d: &ArrayView<'_>| {
        dispatch::<(A, B, D), R, _>(&[a, b, d], &options, |(a, b, d)| {
            method(instance, a, b, d).map_err(Error::method)
        })
    }
}

/// Vectorizes a method of four arguments.
pub fn vectorize4<C, A, B, D, G, R>(
    method: impl Fn(&C, A, B, D, G) -> R,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    G: Scalar,
    R: Scalar,
{
    vectorize4_with(method, VectorizeOptions::default())
}

pub fn vectorize4_with<C, A, B, D, G, R>(
    method: impl Fn(&C, A, B, D, G) -> R,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    G: Scalar,
    R: Scalar,
{
    try_vectorize4_with(
        move |instance: &C, a, b, d, g| Ok::<_, Infallible>(method(instance, a, b, d, g)),
        options,
    )
}

/// Vectorizes a fallible method of four arguments.
pub fn try_vectorize4<C, A, B, D, G, R, E>(
    method: impl Fn(&C, A, B, D, G) -> std::result::Result<R, E>,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    G: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    try_vectorize4_with(method, VectorizeOptions::default())
}

pub fn try_vectorize4_with<C, A, B, D, G, R, E>(
    method: impl Fn(&C, A, B, D, G) -> std::result::Result<R, E>,
    options: VectorizeOptions,
) -> impl Fn(&C, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>, &ArrayView<'_>) -> Result<OwnedArray>
where
    C: ?Sized,
    A: Scalar,
    B: Scalar,
    D: Scalar,
    G: Scalar,
    R: Scalar,
    E: std::error::Error + Send + Sync + 'static,
{
    move |instance: &C,
          a: &ArrayView<'_>,
          b: &ArrayView<'_>,
          d: &ArrayView<'_>,
          g: &ArrayView<'_>| {
        dispatch::<(A, B, D, G), R, _>(&[a, b, d, g], &options, |(a, b, d, g)| {
            method(instance, a, b, d, g).map_err(Error::method)
        })
    }
}
