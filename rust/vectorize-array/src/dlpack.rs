//! DLPack interchange.
//!
//! Host runtimes pass input arrays as borrowed [`DLTensor`]s and receive
//! outputs as [`DLManagedTensor`]s. A managed tensor owns its buffer; the host
//! hands it back by invoking the `deleter` exactly once.

use std::{ffi::c_void, ptr::NonNull};

use vectorize_common::{Dtype, DtypeCode, Result, error::Error, verify_arg};
use vectorize_common_traits::memory_owner::MemoryOwner;

use crate::{output::OwnedArray, view::ArrayView};

/// `kDLCPU`.
pub const DL_DEVICE_CPU: i32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DLDevice {
    pub device_type: i32,
    pub device_id: i32,
}

impl DLDevice {
    pub const CPU: DLDevice = DLDevice {
        device_type: DL_DEVICE_CPU,
        device_id: 0,
    };
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DLDataType {
    pub code: u8,
    pub bits: u8,
    pub lanes: u16,
}

impl From<Dtype> for DLDataType {
    fn from(dtype: Dtype) -> Self {
        DLDataType {
            code: dtype.code as u8,
            bits: dtype.bits,
            lanes: dtype.lanes,
        }
    }
}

impl TryFrom<DLDataType> for Dtype {
    type Error = Error;

    fn try_from(dtype: DLDataType) -> Result<Dtype> {
        let code = DtypeCode::from_u8(dtype.code).ok_or_else(|| {
            Error::invalid_arg("dtype", format!("unknown type code {}", dtype.code))
        })?;
        Ok(Dtype {
            code,
            bits: dtype.bits,
            lanes: dtype.lanes,
        })
    }
}

/// A borrowed tensor descriptor.
#[repr(C)]
#[derive(Debug)]
pub struct DLTensor {
    pub data: *mut c_void,
    pub device: DLDevice,
    pub ndim: i32,
    pub dtype: DLDataType,
    pub shape: *mut i64,
    /// Strides in elements; null for a row-major layout.
    pub strides: *mut i64,
    pub byte_offset: u64,
}

/// A tensor descriptor together with the means to release it.
#[repr(C)]
#[derive(Debug)]
pub struct DLManagedTensor {
    pub dl_tensor: DLTensor,
    pub manager_ctx: *mut c_void,
    pub deleter: Option<unsafe extern "C" fn(*mut DLManagedTensor)>,
}

impl<'a> ArrayView<'a> {
    /// Creates a view over a DLPack tensor.
    ///
    /// Only CPU tensors are accepted. Null strides denote a row-major layout,
    /// and `byte_offset` is added to `data` to locate the first element.
    ///
    /// # Safety
    ///
    /// `tensor` must be a valid DLPack descriptor: `shape` (and `strides`, if
    /// not null) must point to `ndim` values, and the described elements must
    /// stay readable and unmodified for `'a`.
    pub unsafe fn from_dl_tensor(tensor: &'a DLTensor) -> Result<ArrayView<'a>> {
        if tensor.device.device_type != DL_DEVICE_CPU {
            return Err(Error::invalid_arg(
                "device",
                format!(
                    "unsupported device type {}; only CPU tensors are accepted",
                    tensor.device.device_type
                ),
            ));
        }
        let dtype = Dtype::try_from(tensor.dtype)?;
        let ndim = usize::try_from(tensor.ndim)
            .map_err(|_| Error::invalid_arg("ndim", format!("invalid ndim {}", tensor.ndim)))?;
        verify_arg!(shape, ndim == 0 || !tensor.shape.is_null());

        // SAFETY: the caller guarantees that `shape` and non-null `strides`
        // hold `ndim` values.
        let (raw_shape, raw_strides) = unsafe {
            (
                raw_dims(tensor.shape, ndim),
                (!tensor.strides.is_null()).then(|| raw_dims(tensor.strides, ndim)),
            )
        };
        let shape = raw_shape
            .iter()
            .map(|&n| usize::try_from(n))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::invalid_arg("shape", format!("negative extent in {raw_shape:?}")))?;
        let strides = raw_strides
            .map(|strides| {
                strides
                    .iter()
                    .map(|&s| isize::try_from(s))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| Error::invalid_arg("strides", "stride out of range"))
            })
            .transpose()?;

        let byte_offset = usize::try_from(tensor.byte_offset)
            .map_err(|_| Error::invalid_arg("byte_offset", "offset out of range"))?;
        let ptr = (tensor.data as *const u8).wrapping_add(byte_offset);
        // SAFETY: forwarded from the caller.
        unsafe { ArrayView::from_raw_parts(ptr, dtype, &shape, strides.as_deref()) }
    }
}

unsafe fn raw_dims<'a>(ptr: *const i64, ndim: usize) -> &'a [i64] {
    if ndim == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(ptr, ndim) }
    }
}

/// State kept alive behind `manager_ctx` of an exported tensor.
struct ExportContext {
    array: OwnedArray,
    shape: Box<[i64]>,
    strides: Box<[i64]>,
}

impl OwnedArray {
    /// Transfers the array to a host runtime.
    ///
    /// The returned tensor owns the buffer. Invoking its `deleter` frees the
    /// buffer and runs the release hook; until then the array is leaked.
    pub fn into_dlpack(self) -> Result<NonNull<DLManagedTensor>> {
        let ndim = i32::try_from(self.ndim())
            .map_err(|_| Error::invalid_arg("ndim", "rank exceeds i32 range"))?;
        let shape = self
            .shape()
            .iter()
            .map(|&n| i64::try_from(n))
            .collect::<std::result::Result<Box<[i64]>, _>>()
            .map_err(|_| Error::invalid_arg("shape", "extent exceeds i64 range"))?;
        let strides = self
            .strides()
            .iter()
            .map(|&s| s as i64)
            .collect::<Box<[i64]>>();
        let dtype = DLDataType::from(self.dtype());

        let mut context = Box::new(ExportContext {
            array: self,
            shape,
            strides,
        });
        // The buffer does not move with the context.
        let data = context.array.memory().ptr as *mut c_void;
        let dl_tensor = DLTensor {
            data,
            device: DLDevice::CPU,
            ndim,
            dtype,
            shape: context.shape.as_mut_ptr(),
            strides: context.strides.as_mut_ptr(),
            byte_offset: 0,
        };
        log::trace!(
            "exporting {} array of shape {:?}",
            context.array.dtype(),
            context.array.shape()
        );

        let managed = Box::new(DLManagedTensor {
            dl_tensor,
            manager_ctx: Box::into_raw(context) as *mut c_void,
            deleter: Some(release_exported),
        });
        Ok(NonNull::from(Box::leak(managed)))
    }
}

unsafe extern "C" fn release_exported(managed: *mut DLManagedTensor) {
    if managed.is_null() {
        return;
    }
    // SAFETY: `managed` and its context were leaked by `into_dlpack`, and the
    // deleter contract allows a single invocation.
    unsafe {
        let managed = Box::from_raw(managed);
        if !managed.manager_ctx.is_null() {
            drop(Box::from_raw(managed.manager_ctx as *mut ExportContext));
        }
    }
}

/// Invokes the deleter of a managed tensor, if it has one.
///
/// # Safety
///
/// `managed` must be a valid managed tensor that has not been released yet.
pub unsafe fn release(managed: NonNull<DLManagedTensor>) {
    unsafe {
        if let Some(deleter) = managed.as_ref().deleter {
            deleter(managed.as_ptr());
        }
    }
}
