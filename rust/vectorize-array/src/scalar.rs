//! Scalar element types.
//!
//! Only the types implementing [`Scalar`] may appear as arguments or return
//! values of a vectorized method. The trait is sealed: the set of scalars is the
//! set of element types a host array can describe with a single-lane [`Dtype`].

use half::{bf16, f16};
use vectorize_common::Dtype;

mod sealed {
    pub trait Sealed {}
}

/// A scalar element type with a statically known element type tag.
pub trait Scalar: bytemuck::NoUninit + Send + Sync + 'static + sealed::Sealed {
    /// Element type tag of arrays holding this scalar.
    const DTYPE: Dtype;

    /// Decodes a value from exactly `size_of::<Self>()` native-endian bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` has the wrong length.
    fn read_ne(bytes: &[u8]) -> Self;

    /// Encodes the value into exactly `size_of::<Self>()` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` has the wrong length.
    #[inline]
    fn write_ne(self, bytes: &mut [u8]) {
        bytes.copy_from_slice(bytemuck::bytes_of(&self));
    }
}

macro_rules! impl_pod_scalar {
    ($($ty:ty => $dtype:expr),+ $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Scalar for $ty {
                const DTYPE: Dtype = $dtype;

                #[inline]
                fn read_ne(bytes: &[u8]) -> Self {
                    bytemuck::pod_read_unaligned(bytes)
                }
            }
        )+
    };
}

impl_pod_scalar!(
    i8 => Dtype::I8,
    i16 => Dtype::I16,
    i32 => Dtype::I32,
    i64 => Dtype::I64,
    u8 => Dtype::U8,
    u16 => Dtype::U16,
    u32 => Dtype::U32,
    u64 => Dtype::U64,
    f16 => Dtype::F16,
    bf16 => Dtype::BF16,
    f32 => Dtype::F32,
    f64 => Dtype::F64,
);

impl sealed::Sealed for bool {}

// Any non-zero byte reads as `true`, so foreign bool buffers never yield an
// invalid `bool`.
impl Scalar for bool {
    const DTYPE: Dtype = Dtype::BOOL;

    #[inline]
    fn read_ne(bytes: &[u8]) -> Self {
        let [b] = bytes else {
            panic!("bool element must be one byte, got {}", bytes.len());
        };
        *b != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Scalar + PartialEq + std::fmt::Debug>(value: T) {
        let mut buf = vec![0u8; std::mem::size_of::<T>()];
        value.write_ne(&mut buf);
        assert_eq!(T::read_ne(&buf), value);
        assert_eq!(T::DTYPE.size_in_bytes(), std::mem::size_of::<T>());
    }

    #[test]
    fn test_scalar_encoding() {
        round_trip(-5i8);
        round_trip(-30000i16);
        round_trip(i32::MIN);
        round_trip(i64::MAX);
        round_trip(250u8);
        round_trip(65000u16);
        round_trip(u32::MAX);
        round_trip(u64::MAX - 1);
        round_trip(f16::from_f32(1.5));
        round_trip(bf16::from_f32(-2.25));
        round_trip(3.5f32);
        round_trip(-1e300f64);
        round_trip(true);
        round_trip(false);
    }

    #[test]
    fn test_unaligned_read() {
        let buf = [0u8, 0, 0, 0, 0, 0, 0, 0xf0, 0x3f];
        assert_eq!(f64::read_ne(&buf[1..]), f64::from_ne_bytes(buf[1..].try_into().unwrap()));
    }

    #[test]
    fn test_bool_from_foreign_bytes() {
        assert!(bool::read_ne(&[2]));
        assert!(!bool::read_ne(&[0]));
    }

    #[test]
    #[should_panic]
    fn test_wrong_width() {
        let _ = i32::read_ne(&[0, 0]);
    }
}
