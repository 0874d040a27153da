use vectorize_common_traits::memory_owner::{MemoryAllocation, MemoryOwner};

/// A fixed-length, zero-initialized byte vector whose data is aligned to a
/// requested boundary.
///
/// The vector is obtained fallibly: a request that overflows or that the
/// allocator refuses yields an [`AllocationError`] instead of aborting the
/// process. Once created, the length never changes and the data never moves,
/// which makes the vector suitable as the backing store of a buffer whose
/// address is handed out to a host runtime.
pub struct AlignedByteVec {
    /// The underlying byte vector, may include padding at start
    inner: Vec<u8>,
    /// Offset from start of inner vec to maintain alignment
    start: u32,
    /// Required alignment, specified during vector creation.
    alignment: u32,
}

impl AlignedByteVec {
    /// Default alignment in bytes.
    pub const ALIGNMENT: usize = 64;
    /// Largest supported alignment in bytes.
    pub const MAX_ALIGNMENT: usize = 4096;
    /// Block size for capacity calculations
    const BLOCK_SIZE: usize = 64;

    /// Allocates a vector of `len` zero bytes whose data starts at a multiple
    /// of `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two or exceeds [`Self::MAX_ALIGNMENT`].
    pub fn try_zeroed_with_alignment(
        len: usize,
        alignment: usize,
    ) -> Result<AlignedByteVec, AllocationError> {
        let alignment = alignment.max(1);
        assert!(alignment.is_power_of_two());
        assert!(alignment <= Self::MAX_ALIGNMENT);

        if len == 0 {
            return Ok(AlignedByteVec {
                inner: Vec::new(),
                start: 0,
                alignment: alignment as u32,
            });
        }

        let vec_capacity = checked_round_up(len, Self::BLOCK_SIZE)
            .and_then(|n| n.checked_add(alignment))
            .ok_or(AllocationError { requested: len })?;

        let mut vec = Vec::<u8>::new();
        vec.try_reserve_exact(vec_capacity)
            .map_err(|_| AllocationError { requested: len })?;

        let p = vec.as_ptr() as usize;
        let start = p.next_multiple_of(alignment) - p;
        // Fits into the reservation above, so the data never moves.
        vec.resize(start + len, 0);
        debug_assert!(vec.capacity() >= vec_capacity);

        Ok(AlignedByteVec {
            inner: vec,
            start: start as u32,
            alignment: alignment as u32,
        })
    }

    /// Returns the number of bytes in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len() - self.start_offset()
    }

    /// Returns true if the vector contains no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Alignment requested at creation.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment as usize
    }

    /// Returns the number of bytes reserved past the aligned start.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity() - self.start_offset()
    }

    /// Returns a raw pointer to the vector's buffer.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    /// Returns a slice containing the entire vector.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner[self.start_offset()..]
    }

    /// Returns a mutable slice containing the entire vector.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let start = self.start_offset();
        &mut self.inner[start..]
    }

    #[inline]
    fn start_offset(&self) -> usize {
        self.start as usize
    }
}

impl AlignedByteVec {
    /// Returns a slice of `T` values from the vector's data.
    ///
    /// # Panics
    ///
    /// Panics if the data is not aligned for `T` or its length is not a multiple
    /// of `size_of::<T>()`.
    #[inline]
    pub fn typed_data<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        if self.is_empty() {
            return &[];
        }
        bytemuck::cast_slice(self.as_slice())
    }
}

impl std::ops::Deref for AlignedByteVec {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::ops::DerefMut for AlignedByteVec {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl std::fmt::Debug for AlignedByteVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedByteVec")
            .field("len", &self.len())
            .field("cap", &self.capacity())
            .field("alignment", &self.alignment)
            .field("internal_offset", &self.start)
            .field("internal_cap", &self.inner.capacity())
            .finish_non_exhaustive()
    }
}

unsafe impl MemoryOwner for AlignedByteVec {
    fn memory(&self) -> MemoryAllocation {
        MemoryAllocation {
            ptr: self.as_ptr(),
            len: self.len(),
            capacity: self.capacity(),
            alignment: if self.is_empty() { 1 } else { self.alignment() },
        }
    }
}

/// An error that occurs when an aligned buffer cannot be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocationError {
    /// Requested length in bytes.
    pub requested: usize,
}

impl std::fmt::Display for AllocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to allocate {} bytes", self.requested)
    }
}

impl std::error::Error for AllocationError {}

/// Rounds up a number to the next multiple of block_size, `None` on overflow.
#[inline]
fn checked_round_up(n: usize, block_size: usize) -> Option<usize> {
    Some(n.checked_add(block_size - 1)? & !(block_size - 1))
}
