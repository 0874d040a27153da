//! Owners of buffers that may be handed across an ownership boundary.

/// A type that exclusively owns a block of memory whose address other parties
/// may hold on to, for example a host runtime reading an exported array.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - the block described by `memory()` keeps its address for as long as the
///   owner is alive, even when the owner itself is moved;
/// - nothing but the owner frees or reallocates the block;
/// - `ptr` is aligned to `alignment` bytes, and `len <= capacity`.
pub unsafe trait MemoryOwner {
    /// Describes the owned block.
    fn memory(&self) -> MemoryAllocation;
}

/// Address, size and alignment of an owned block of memory.
#[derive(Debug, Clone)]
pub struct MemoryAllocation {
    /// First byte of the block.
    pub ptr: *const u8,
    /// Bytes in use.
    pub len: usize,
    /// Bytes reserved.
    pub capacity: usize,
    /// Guaranteed alignment of `ptr`.
    pub alignment: usize,
}

impl MemoryAllocation {
    /// Returns `true` if `ptr` honors the declared alignment.
    pub fn is_aligned(&self) -> bool {
        self.is_aligned_to(self.alignment)
    }

    /// Returns `true` if `ptr` is a multiple of `alignment`, which must be a
    /// power of two.
    pub fn is_aligned_to(&self, alignment: usize) -> bool {
        alignment.is_power_of_two() && (self.ptr as usize) & (alignment - 1) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_checks() {
        let block = MemoryAllocation {
            ptr: 256 as *const u8,
            len: 10,
            capacity: 64,
            alignment: 128,
        };
        assert!(block.is_aligned());
        assert!(block.is_aligned_to(256));
        assert!(!block.is_aligned_to(512));
        assert!(!block.is_aligned_to(3));
    }
}
