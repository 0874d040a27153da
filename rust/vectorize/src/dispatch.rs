//! The element-wise dispatch loop.

use vectorize_array::{ArgTuple, ArrayView, OwnedArray, Scalar, validate};
use vectorize_common::{Result, error::Error};

use crate::options::VectorizeOptions;

/// Applies `call` to every logical element of `inputs` and collects the
/// results into a new array shaped like the first input.
///
/// The inputs are validated against `Args::DTYPES` before anything is
/// allocated. Elements are visited in ascending row-major order on the calling
/// thread, and each result is stored at the index of its arguments. The first
/// error, whether from marshalling or from `call`, is returned as is; the
/// partially filled output is released and never observed.
pub fn dispatch<Args, R, F>(
    inputs: &[&ArrayView<'_>],
    options: &VectorizeOptions,
    mut call: F,
) -> Result<OwnedArray>
where
    Args: ArgTuple,
    R: Scalar,
    F: FnMut(Args) -> Result<R>,
{
    validate(inputs, Args::DTYPES)?;
    let first = inputs
        .first()
        .ok_or_else(|| Error::invalid_arg("inputs", "no input arrays"))?;

    log::trace!(
        "dispatching {} elements of {:?} over {} inputs {:?} -> {}",
        first.len(),
        first.shape(),
        Args::ARITY,
        Args::DTYPES,
        R::DTYPE
    );

    let mut output = OwnedArray::allocate_like::<R>(first, options.output())?;
    for index in 0..output.len() {
        let args = Args::marshal(inputs, index)?;
        output.set(index, call(args)?)?;
    }
    Ok(output)
}
