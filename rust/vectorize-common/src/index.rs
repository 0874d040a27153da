//! Index normalization for sequence-like access from host runtimes.

use crate::{Result, error::Error};

/// Converts a possibly negative index into a position within `0..len`.
///
/// Negative values count from the end, so `-1` addresses the last element.
/// Indices outside `-len..len` are rejected.
pub fn convert_index(len: usize, index: isize) -> Result<usize> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index as usize).filter(|&i| i < len)
    };
    resolved.ok_or_else(|| {
        Error::invalid_arg(
            "index",
            format!("index {index} is out of range for length {len}"),
        )
    })
}
