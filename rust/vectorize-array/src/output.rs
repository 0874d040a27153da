//! Owned output arrays.
//!
//! An [`OwnedArray`] is produced by the vectorization machinery and handed to
//! the caller, which becomes its exclusive owner. The backing buffer is freed
//! exactly once: when the array is dropped, or, after [`OwnedArray::into_dlpack`],
//! when the host runtime invokes the DLPack deleter.

use std::sync::Arc;

use vectorize_bytes::{AlignedByteVec, AllocationError};
use vectorize_common::{Dtype, Result, error::Error, index::convert_index, verify_arg};
use vectorize_common_traits::memory_owner::{MemoryAllocation, MemoryOwner};

use crate::{
    layout::{self, Dims},
    scalar::Scalar,
    view::ArrayView,
};

/// Callback invoked with the number of released bytes after an output buffer
/// has been freed.
pub type ReleaseHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Allocation settings for output buffers.
#[derive(Clone)]
pub struct OutputOptions {
    alignment: usize,
    max_bytes: Option<usize>,
    release_hook: Option<ReleaseHook>,
}

impl OutputOptions {
    /// Default alignment of output buffers in bytes.
    pub const DEFAULT_ALIGNMENT: usize = AlignedByteVec::ALIGNMENT;

    pub fn new() -> OutputOptions {
        OutputOptions {
            alignment: Self::DEFAULT_ALIGNMENT,
            max_bytes: None,
            release_hook: None,
        }
    }

    /// Sets the alignment of output buffers. Must be a power of two no greater
    /// than [`AlignedByteVec::MAX_ALIGNMENT`]; the alignment of the element type
    /// is honored regardless.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Limits the size of a single output buffer. Larger requests fail with an
    /// allocation failure before any memory is reserved.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Registers a callback that observes every buffer release.
    pub fn with_release_hook(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.release_hook = Some(Arc::new(hook));
        self
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn max_bytes(&self) -> Option<usize> {
        self.max_bytes
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OutputOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputOptions")
            .field("alignment", &self.alignment)
            .field("max_bytes", &self.max_bytes)
            .field("release_hook", &self.release_hook.is_some())
            .finish()
    }
}

/// Ownership token of an output buffer: reports the release of `bytes` to the
/// hook exactly once, when dropped.
struct ReleaseToken {
    bytes: usize,
    hook: Option<ReleaseHook>,
}

impl Drop for ReleaseToken {
    fn drop(&mut self) {
        if let Some(hook) = self.hook.take() {
            hook(self.bytes);
        }
    }
}

/// An exclusively owned array of scalars.
pub struct OwnedArray {
    buffer: AlignedByteVec,
    dtype: Dtype,
    shape: Dims<usize>,
    strides: Dims<isize>,
    len: usize,
    row_major: bool,
    // Declared after `buffer`: the hook observes an already freed buffer.
    _token: ReleaseToken,
}

impl OwnedArray {
    /// Allocates a zeroed output array for elements of type `R`, with the shape
    /// of `like`.
    ///
    /// The strides of `like` are kept when they describe a compact layout of at
    /// least one element, otherwise the output is row-major.
    pub fn allocate_like<R: Scalar>(
        like: &ArrayView<'_>,
        options: &OutputOptions,
    ) -> Result<OwnedArray> {
        let strides = if like.is_compact() && !like.is_empty() {
            like.strides().iter().copied().collect()
        } else {
            layout::row_major_strides(like.shape())
        };
        Self::allocate(R::DTYPE, like.shape(), strides, options)
    }

    /// Allocates a zeroed row-major array of `dtype` elements.
    pub fn zeroed(dtype: Dtype, shape: &[usize], options: &OutputOptions) -> Result<OwnedArray> {
        Self::allocate(dtype, shape, layout::row_major_strides(shape), options)
    }

    fn allocate(
        dtype: Dtype,
        shape: &[usize],
        strides: Dims<isize>,
        options: &OutputOptions,
    ) -> Result<OwnedArray> {
        verify_arg!(dtype, dtype.is_scalar() && dtype.bits != 0);
        verify_arg!(
            alignment,
            options.alignment.is_power_of_two()
                && options.alignment <= AlignedByteVec::MAX_ALIGNMENT
        );
        debug_assert!(layout::is_compact(shape, &strides));

        let len = layout::element_count(shape)
            .ok_or_else(|| Error::invalid_arg("shape", "element count overflows"))?;
        let bytes = len
            .checked_mul(dtype.size_in_bytes())
            .ok_or_else(|| Error::allocation_failure(None))?;
        if options.max_bytes.is_some_and(|max| bytes > max) {
            log::debug!(
                "output of {bytes} bytes exceeds the limit of {:?} bytes",
                options.max_bytes
            );
            return Err(Error::allocation_failure(Some(bytes)));
        }

        let alignment = options.alignment.max(dtype.size_in_bytes().next_power_of_two());
        let buffer = AlignedByteVec::try_zeroed_with_alignment(bytes, alignment).map_err(
            |AllocationError { requested }| {
                log::debug!("failed to allocate output buffer of {requested} bytes");
                Error::allocation_failure(Some(requested))
            },
        )?;

        Ok(OwnedArray {
            buffer,
            dtype,
            row_major: layout::is_row_major(shape, &strides),
            shape: shape.iter().copied().collect(),
            strides,
            len,
            _token: ReleaseToken {
                bytes,
                hook: options.release_hook.clone(),
            },
        })
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

    /// Size of the buffer in bytes.
    #[inline]
    pub fn nbytes(&self) -> usize {
        self.buffer.len()
    }

    /// Borrows the array as a read-only view.
    pub fn view(&self) -> ArrayView<'_> {
        ArrayView::from_valid_parts(
            &self.buffer,
            self.dtype,
            &self.shape,
            &self.strides,
            self.len,
        )
    }

    /// Writes `value` at row-major flat index `index`.
    #[inline]
    pub fn set<T: Scalar>(&mut self, index: usize, value: T) -> Result<()> {
        self.check_element_type::<T>()?;
        if index >= self.len {
            return Err(Error::invalid_arg(
                "index",
                format!("index {index} is out of range for array of {} elements", self.len),
            ));
        }
        let offset = if self.row_major {
            index
        } else {
            // Compact layouts have non-negative offsets for every element.
            layout::offset_of(&self.shape, &self.strides, index) as usize
        };
        let size = std::mem::size_of::<T>();
        let start = offset * size;
        value.write_ne(&mut self.buffer[start..start + size]);
        Ok(())
    }

    /// Reads the element at row-major flat `index`; negative indices count from
    /// the end.
    pub fn get<T: Scalar>(&self, index: isize) -> Result<T> {
        self.check_element_type::<T>()?;
        let index = convert_index(self.len, index)?;
        self.view().get(index)
    }

    /// Copies all elements, in row-major logical order.
    pub fn to_vec<T: Scalar>(&self) -> Result<Vec<T>> {
        self.check_element_type::<T>()?;
        self.view().to_vec()
    }

    /// The buffer contents in memory order.
    pub fn as_slice<T>(&self) -> Result<&[T]>
    where
        T: Scalar + bytemuck::AnyBitPattern,
    {
        self.check_element_type::<T>()?;
        Ok(self.buffer.typed_data())
    }

    fn check_element_type<T: Scalar>(&self) -> Result<()> {
        if T::DTYPE != self.dtype {
            return Err(Error::invalid_arg(
                "T",
                format!("requested {} elements from an array of {}", T::DTYPE, self.dtype),
            ));
        }
        Ok(())
    }
}

unsafe impl MemoryOwner for OwnedArray {
    fn memory(&self) -> MemoryAllocation {
        self.buffer.memory()
    }
}

impl std::fmt::Debug for OwnedArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedArray")
            .field("dtype", &self.dtype)
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}
