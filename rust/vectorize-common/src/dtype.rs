//! Runtime element type tags.
//!
//! A [`Dtype`] identifies the scalar type stored in an array buffer. The layout of
//! the tag follows the DLPack `DLDataType` triple (type code, bit width, lane count),
//! so tags coming from a host runtime can be compared directly with the tags derived
//! from Rust scalar types.

use std::fmt;

/// Type code of a [`Dtype`], numerically identical to DLPack's `DLDataTypeCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DtypeCode {
    Int = 0,
    UInt = 1,
    Float = 2,
    OpaqueHandle = 3,
    Bfloat = 4,
    Complex = 5,
    Bool = 6,
}

impl DtypeCode {
    /// Maps a raw DLPack type code to a `DtypeCode`.
    pub fn from_u8(code: u8) -> Option<DtypeCode> {
        let code = match code {
            0 => DtypeCode::Int,
            1 => DtypeCode::UInt,
            2 => DtypeCode::Float,
            3 => DtypeCode::OpaqueHandle,
            4 => DtypeCode::Bfloat,
            5 => DtypeCode::Complex,
            6 => DtypeCode::Bool,
            _ => return None,
        };
        Some(code)
    }

    fn name(&self) -> &'static str {
        match self {
            DtypeCode::Int => "int",
            DtypeCode::UInt => "uint",
            DtypeCode::Float => "float",
            DtypeCode::OpaqueHandle => "handle",
            DtypeCode::Bfloat => "bfloat",
            DtypeCode::Complex => "complex",
            DtypeCode::Bool => "bool",
        }
    }
}

/// Element type tag of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dtype {
    pub code: DtypeCode,
    pub bits: u8,
    pub lanes: u16,
}

impl Dtype {
    pub const I8: Dtype = Dtype::scalar(DtypeCode::Int, 8);
    pub const I16: Dtype = Dtype::scalar(DtypeCode::Int, 16);
    pub const I32: Dtype = Dtype::scalar(DtypeCode::Int, 32);
    pub const I64: Dtype = Dtype::scalar(DtypeCode::Int, 64);
    pub const U8: Dtype = Dtype::scalar(DtypeCode::UInt, 8);
    pub const U16: Dtype = Dtype::scalar(DtypeCode::UInt, 16);
    pub const U32: Dtype = Dtype::scalar(DtypeCode::UInt, 32);
    pub const U64: Dtype = Dtype::scalar(DtypeCode::UInt, 64);
    pub const F16: Dtype = Dtype::scalar(DtypeCode::Float, 16);
    pub const F32: Dtype = Dtype::scalar(DtypeCode::Float, 32);
    pub const F64: Dtype = Dtype::scalar(DtypeCode::Float, 64);
    pub const BF16: Dtype = Dtype::scalar(DtypeCode::Bfloat, 16);
    pub const BOOL: Dtype = Dtype::scalar(DtypeCode::Bool, 8);

    /// Creates a single-lane tag.
    pub const fn scalar(code: DtypeCode, bits: u8) -> Dtype {
        Dtype {
            code,
            bits,
            lanes: 1,
        }
    }

    /// Returns `true` if the tag describes one value per element.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.lanes == 1
    }

    /// Size of one element in bytes, rounded up to whole bytes.
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        (self.bits as usize * self.lanes as usize).div_ceil(8)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code == DtypeCode::Bool {
            f.write_str("bool")?;
        } else {
            write!(f, "{}{}", self.code.name(), self.bits)?;
        }
        if self.lanes != 1 {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}
