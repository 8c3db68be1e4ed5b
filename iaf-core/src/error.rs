use core::fmt;

/// Problems reported by the opt-in parameter check. The kernel itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    InvalidParameter(&'static str),
    NonFinite(&'static str),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            KernelError::NonFinite(field) => write!(f, "non-finite value in {}", field),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KernelError {}

pub type KernelResult<T, E = KernelError> = core::result::Result<T, E>;
