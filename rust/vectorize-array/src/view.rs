//! Read-only views over externally owned arrays.

use vectorize_common::{Dtype, Result, error::Error, verify_arg};

use crate::{
    layout::{self, Dims},
    scalar::Scalar,
};

/// A borrowed, read-only descriptor of a strided array.
///
/// The view exposes rank, shape, strides (in elements), the element type tag,
/// the element count and the data pointer of a buffer it does not own. All
/// element reads are checked against the type tag and against the byte span
/// the view was created over, so a mismatched or corrupt descriptor results
/// in an error rather than an out-of-bounds read.
#[derive(Clone)]
pub struct ArrayView<'a> {
    /// Every byte reachable through `shape` and `strides`.
    bytes: &'a [u8],
    /// Byte position of the first logical element within `bytes`.
    origin: usize,
    dtype: Dtype,
    shape: Dims<usize>,
    strides: Dims<isize>,
    len: usize,
    row_major: bool,
}

impl<'a> ArrayView<'a> {
    /// Creates a row-major view of `data` with the given shape.
    pub fn from_slice<T: Scalar>(data: &'a [T], shape: &[usize]) -> Result<ArrayView<'a>> {
        if layout::element_count(shape) != Some(data.len()) {
            return Err(Error::invalid_arg(
                "shape",
                format!("shape {shape:?} does not describe {} elements", data.len()),
            ));
        }
        let strides = layout::row_major_strides(shape);
        Self::from_bytes(bytemuck::cast_slice(data), T::DTYPE, shape, &strides, 0)
    }

    /// Creates a one-dimensional view of `data`.
    pub fn from_vec_slice<T: Scalar>(data: &'a [T]) -> ArrayView<'a> {
        let len = data.len();
        ArrayView {
            bytes: bytemuck::cast_slice(data),
            origin: 0,
            dtype: T::DTYPE,
            shape: std::iter::once(len).collect(),
            strides: std::iter::once(1).collect(),
            len,
            row_major: true,
        }
    }

    /// Creates a strided view of `data`.
    ///
    /// `offset` is the index in `data` of the first logical element; strides
    /// are in elements and may be negative.
    pub fn from_slice_strided<T: Scalar>(
        data: &'a [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<ArrayView<'a>> {
        let byte_offset = offset
            .checked_mul(std::mem::size_of::<T>())
            .ok_or_else(|| Error::invalid_arg("offset", "offset overflows"))?;
        Self::from_bytes(
            bytemuck::cast_slice(data),
            T::DTYPE,
            shape,
            strides,
            byte_offset,
        )
    }

    /// Creates a view over raw bytes holding elements of type `dtype`.
    ///
    /// `byte_offset` is the byte position in `bytes` of the first logical element.
    /// Fails if any element reachable through `shape` and `strides` lies outside
    /// of `bytes`.
    pub fn from_bytes(
        bytes: &'a [u8],
        dtype: Dtype,
        shape: &[usize],
        strides: &[isize],
        byte_offset: usize,
    ) -> Result<ArrayView<'a>> {
        verify_arg!(dtype, dtype.is_scalar() && dtype.bits != 0);
        verify_arg!(strides, strides.len() == shape.len());
        let len = layout::element_count(shape)
            .ok_or_else(|| Error::invalid_arg("shape", "element count overflows"))?;

        if len != 0 {
            let (lo, hi) = byte_span(dtype, shape, strides)?;
            let origin = isize::try_from(byte_offset)
                .map_err(|_| Error::invalid_arg("byte_offset", "offset overflows"))?;
            let in_bounds = origin
                .checked_add(lo)
                .zip(origin.checked_add(hi))
                .is_some_and(|(first, end)| first >= 0 && end as usize <= bytes.len());
            if !in_bounds {
                return Err(Error::invalid_arg(
                    "strides",
                    format!(
                        "array of shape {shape:?} with strides {strides:?} at byte offset \
                         {byte_offset} exceeds buffer of {} bytes",
                        bytes.len()
                    ),
                ));
            }
        }

        Ok(ArrayView {
            bytes,
            origin: byte_offset,
            dtype,
            shape: shape.iter().copied().collect(),
            strides: strides.iter().copied().collect(),
            len,
            row_major: layout::is_row_major(shape, strides),
        })
    }

    /// Creates a view over memory owned by a host runtime.
    ///
    /// `ptr` addresses the first logical element. `strides` of `None` denote a
    /// row-major layout.
    ///
    /// # Safety
    ///
    /// For the lifetime `'a`, every element reachable through `shape` and
    /// `strides` must be readable through `ptr`, and must not be mutated.
    pub unsafe fn from_raw_parts(
        ptr: *const u8,
        dtype: Dtype,
        shape: &[usize],
        strides: Option<&[isize]>,
    ) -> Result<ArrayView<'a>> {
        let strides = match strides {
            Some(strides) => strides.iter().copied().collect(),
            None => layout::row_major_strides(shape),
        };
        verify_arg!(dtype, dtype.is_scalar() && dtype.bits != 0);
        verify_arg!(strides, strides.len() == shape.len());
        let len = layout::element_count(shape)
            .ok_or_else(|| Error::invalid_arg("shape", "element count overflows"))?;
        if len == 0 {
            return Self::from_bytes(&[], dtype, shape, &strides, 0);
        }
        verify_arg!(ptr, !ptr.is_null());

        let (lo, hi) = byte_span(dtype, shape, &strides)?;
        // SAFETY: the caller guarantees that every reachable element, and thus
        // the whole span between the lowest and highest one, is readable.
        let bytes = unsafe {
            std::slice::from_raw_parts(ptr.offset(lo), (hi - lo) as usize)
        };
        Self::from_bytes(bytes, dtype, shape, &strides, lo.unsigned_abs())
    }

    /// Creates a view over a buffer whose layout is already known to be valid.
    /// Reads remain bounds-checked.
    pub(crate) fn from_valid_parts(
        bytes: &'a [u8],
        dtype: Dtype,
        shape: &[usize],
        strides: &[isize],
        len: usize,
    ) -> ArrayView<'a> {
        ArrayView {
            bytes,
            origin: 0,
            dtype,
            shape: shape.iter().copied().collect(),
            strides: strides.iter().copied().collect(),
            len,
            row_major: layout::is_row_major(shape, strides),
        }
    }

    /// Number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Per-dimension extents.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Per-dimension strides, in elements.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Element type tag.
    #[inline]
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the elements are laid out densely in row-major order.
    #[inline]
    pub fn is_row_major(&self) -> bool {
        self.row_major
    }

    /// Returns `true` if the elements occupy a dense block in some dimension order.
    pub fn is_compact(&self) -> bool {
        layout::is_compact(&self.shape, &self.strides)
    }

    /// Pointer to the first logical element.
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes[self.origin.min(self.bytes.len())..].as_ptr()
    }

    /// Reads the element with row-major flat index `index`.
    ///
    /// Fails with a dtype mismatch if `T` does not match the view's element
    /// type tag, and with an invalid argument error if `index` is out of range.
    #[inline]
    pub fn get<T: Scalar>(&self, index: usize) -> Result<T> {
        self.read_arg(0, index)
    }

    /// Copies all elements, in row-major logical order.
    pub fn to_vec<T: Scalar>(&self) -> Result<Vec<T>> {
        (0..self.len).map(|i| self.get(i)).collect()
    }

    /// Reads element `index` as the value of argument `position`.
    #[inline]
    pub(crate) fn read_arg<T: Scalar>(&self, position: usize, index: usize) -> Result<T> {
        if T::DTYPE != self.dtype {
            return Err(Error::dtype_mismatch(position, T::DTYPE, self.dtype));
        }
        let size = std::mem::size_of::<T>();
        self.element_bytes(index, size)
            .map(T::read_ne)
            .ok_or_else(|| out_of_range(index, self.len))
    }

    #[inline]
    fn element_bytes(&self, index: usize, size: usize) -> Option<&'a [u8]> {
        if index >= self.len {
            return None;
        }
        let offset = if self.row_major {
            index as isize
        } else {
            layout::offset_of(&self.shape, &self.strides, index)
        };
        let start = (self.origin as isize).checked_add(offset.checked_mul(size as isize)?)?;
        let start = usize::try_from(start).ok()?;
        self.bytes.get(start..start.checked_add(size)?)
    }
}

impl std::fmt::Debug for ArrayView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayView")
            .field("dtype", &self.dtype)
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Byte range, relative to the first logical element, covering every element
/// reachable through the layout (end exclusive). The layout must not be empty.
fn byte_span(dtype: Dtype, shape: &[usize], strides: &[isize]) -> Result<(isize, isize)> {
    let size = dtype.size_in_bytes() as isize;
    layout::offset_range(shape, strides)
        .and_then(|(lo, hi)| Some((lo.checked_mul(size)?, hi.checked_add(1)?.checked_mul(size)?)))
        .ok_or_else(|| Error::invalid_arg("strides", "element offsets overflow"))
}

#[cold]
fn out_of_range(index: usize, len: usize) -> Error {
    Error::invalid_arg(
        "index",
        format!("index {index} is out of range for array of {len} elements"),
    )
}
