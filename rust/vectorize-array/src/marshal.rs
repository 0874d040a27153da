//! Reconstruction of typed argument tuples from a group of input arrays.

use vectorize_common::{Dtype, Result, error::Error};

use crate::{scalar::Scalar, view::ArrayView};

mod sealed {
    pub trait Sealed {}
}

/// A tuple of scalar argument types, `(A,)` through `(A, B, C, D)`.
///
/// Implemented for arities one to four only; there is no implementation, and
/// therefore no way to vectorize a method, for any other arity.
///
/// ```compile_fail
/// use vectorize_array::ArgTuple;
///
/// fn arity<T: ArgTuple>() -> usize {
///     T::ARITY
/// }
///
/// arity::<(f64, f64, f64, f64, f64)>();
/// ```
///
/// ```compile_fail
/// use vectorize_array::ArgTuple;
///
/// fn arity<T: ArgTuple>() -> usize {
///     T::ARITY
/// }
///
/// arity::<(f64, String)>();
/// ```
pub trait ArgTuple: Sized + sealed::Sealed {
    /// Number of arguments.
    const ARITY: usize;

    /// Expected element type tag for each argument position.
    const DTYPES: &'static [Dtype];

    /// Reads element `index` of every input, interpreted as the argument type
    /// of its position.
    ///
    /// `inputs` must hold exactly [`Self::ARITY`] views. A view whose type tag
    /// disagrees with its position fails with a dtype mismatch; an index
    /// outside of any view fails with an invalid argument error.
    fn marshal(inputs: &[&ArrayView<'_>], index: usize) -> Result<Self>;
}

macro_rules! impl_arg_tuple {
    ($arity:literal; $($ty:ident $view:ident $position:literal),+) => {
        impl<$($ty: Scalar),+> sealed::Sealed for ($($ty,)+) {}

        impl<$($ty: Scalar),+> ArgTuple for ($($ty,)+) {
            const ARITY: usize = $arity;

            const DTYPES: &'static [Dtype] = &[$($ty::DTYPE),+];

            #[inline]
            fn marshal(inputs: &[&ArrayView<'_>], index: usize) -> Result<Self> {
                let &[$($view),+] = inputs else {
                    return Err(arity_mismatch(Self::ARITY, inputs.len()));
                };
                Ok(($($view.read_arg::<$ty>($position, index)?,)+))
            }
        }
    };
}

impl_arg_tuple!(1; A a 0);
impl_arg_tuple!(2; A a 0, B b 1);
impl_arg_tuple!(3; A a 0, B b 1, C c 2);
impl_arg_tuple!(4; A a 0, B b 1, C c 2, D d 3);

#[cold]
fn arity_mismatch(expected: usize, actual: usize) -> Error {
    Error::invalid_arg(
        "inputs",
        format!("expected {expected} input arrays, got {actual}"),
    )
}
