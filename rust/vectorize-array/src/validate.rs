//! Compatibility checks for a group of input arrays.

use vectorize_common::{Dtype, Result, error::Error, verify_arg};

use crate::view::ArrayView;

/// Verifies that `inputs` can be iterated element-wise in lockstep as the
/// arguments of a method whose parameter types carry the tags `expected`.
///
/// The checks run in order:
/// 1. one input per expected tag;
/// 2. every input has the rank of the first one (`ShapeMismatch`);
/// 3. every input has the per-dimension extents of the first one, and hence
///    the same element count (`ShapeMismatch`);
/// 4. every input's element type tag equals the expected tag for its
///    position (`DtypeMismatch`).
///
/// The cost depends on the number of inputs and their rank, never on the
/// number of elements.
pub fn validate(inputs: &[&ArrayView<'_>], expected: &[Dtype]) -> Result<()> {
    verify_arg!(inputs, !inputs.is_empty());
    verify_arg!(inputs, inputs.len() == expected.len());

    let first = inputs[0];
    for (position, input) in inputs.iter().enumerate().skip(1) {
        if input.ndim() != first.ndim() || input.shape() != first.shape() {
            log::debug!(
                "rejecting argument {position}: shape {:?} differs from {:?}",
                input.shape(),
                first.shape()
            );
            return Err(Error::shape_mismatch(
                position,
                first.shape(),
                input.shape(),
            ));
        }
    }

    for (position, (input, &dtype)) in inputs.iter().zip(expected).enumerate() {
        if input.dtype() != dtype {
            log::debug!(
                "rejecting argument {position}: dtype {} where {dtype} is expected",
                input.dtype()
            );
            return Err(Error::dtype_mismatch(position, dtype, input.dtype()));
        }
    }
    Ok(())
}
