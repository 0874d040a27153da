//! Shape and stride arithmetic.
//!
//! Strides are expressed in elements. A flat index always refers to the
//! row-major (C order) enumeration of the logical index space, independent of
//! the memory layout described by the strides.

use tinyvec::TinyVec;

/// Per-dimension extents or strides, stored inline for up to four dimensions.
pub type Dims<T> = TinyVec<[T; 4]>;

/// Number of elements described by `shape`, or `None` on overflow.
///
/// A rank-0 shape describes a single element.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

/// Row-major strides for `shape`.
pub fn row_major_strides(shape: &[usize]) -> Dims<isize> {
    let mut strides: Dims<isize> = shape.iter().map(|_| 0).collect();
    let mut step = 1isize;
    for (stride, &extent) in strides.iter_mut().zip(shape).rev() {
        *stride = step;
        step = step.saturating_mul(extent.max(1) as isize);
    }
    strides
}

/// Returns `true` if `strides` are the row-major strides of `shape`, ignoring
/// dimensions of extent one.
pub fn is_row_major(shape: &[usize], strides: &[isize]) -> bool {
    if element_count(shape) == Some(0) {
        return true;
    }
    let mut expected = 1isize;
    for (&extent, &stride) in shape.iter().zip(strides).rev() {
        if extent == 1 {
            continue;
        }
        if stride != expected {
            return false;
        }
        expected = expected.saturating_mul(extent as isize);
    }
    true
}

/// Returns `true` if the layout addresses every position of a dense block of
/// exactly `element_count(shape)` elements, in any dimension order.
///
/// Row-major and column-major layouts, as well as any permutation of their
/// dimensions, are compact. Layouts with gaps, overlaps or negative strides
/// are not.
pub fn is_compact(shape: &[usize], strides: &[isize]) -> bool {
    if element_count(shape) == Some(0) {
        return true;
    }
    let mut dims: Dims<(isize, usize)> = shape
        .iter()
        .zip(strides)
        .filter(|&(&extent, _)| extent != 1)
        .map(|(&extent, &stride)| (stride, extent))
        .collect();
    dims.sort_unstable();
    let mut expected = 1isize;
    for (stride, extent) in dims {
        if stride != expected {
            return false;
        }
        expected = expected.saturating_mul(extent as isize);
    }
    true
}

/// Element offset, relative to the first logical element, of the element with
/// row-major flat index `index`.
///
/// `index` must be below `element_count(shape)`.
#[inline]
pub fn offset_of(shape: &[usize], strides: &[isize], mut index: usize) -> isize {
    let mut offset = 0isize;
    for (&extent, &stride) in shape.iter().zip(strides).rev() {
        offset += (index % extent) as isize * stride;
        index /= extent;
    }
    offset
}

/// Smallest and largest element offsets reachable through the layout, or
/// `None` if the layout is empty or its offsets overflow.
pub fn offset_range(shape: &[usize], strides: &[isize]) -> Option<(isize, isize)> {
    if element_count(shape)? == 0 {
        return None;
    }
    let mut lo = 0isize;
    let mut hi = 0isize;
    for (&extent, &stride) in shape.iter().zip(strides) {
        let last = isize::try_from(extent - 1).ok()?.checked_mul(stride)?;
        if last < 0 {
            lo = lo.checked_add(last)?;
        } else {
            hi = hi.checked_add(last)?;
        }
    }
    Some((lo, hi))
}
