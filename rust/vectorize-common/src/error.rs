use thiserror::Error;

use crate::dtype::Dtype;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn shape_mismatch(position: usize, expected: &[usize], actual: &[usize]) -> Error {
        Error(
            ErrorKind::ShapeMismatch {
                position,
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            }
            .into(),
        )
    }

    pub fn dtype_mismatch(position: usize, expected: Dtype, actual: Dtype) -> Error {
        Error(
            ErrorKind::DtypeMismatch {
                position,
                expected,
                actual,
            }
            .into(),
        )
    }

    pub fn allocation_failure(bytes: Option<usize>) -> Error {
        Error(ErrorKind::AllocationFailure { bytes }.into())
    }

    /// Wraps a failure raised by the vectorized method itself.
    pub fn method<E>(source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Method {
                source: Box::new(source),
            }
            .into(),
        )
    }

    #[inline]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::ShapeMismatch { .. })
    }

    #[inline]
    pub fn is_dtype_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::DtypeMismatch { .. })
    }

    #[inline]
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::AllocationFailure { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("shape mismatch for argument {position}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        position: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("dtype mismatch for argument {position}: expected {expected}, got {actual}")]
    DtypeMismatch {
        position: usize,
        expected: Dtype,
        actual: Dtype,
    },

    #[error(
        "failed to allocate output buffer{}",
        .bytes.map(|b| format!(" of {b} bytes")).unwrap_or_default()
    )]
    AllocationFailure { bytes: Option<usize> },

    #[error("vectorized method failed: {source}")]
    Method {
        #[source]
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
