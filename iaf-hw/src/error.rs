use core::fmt;

use iaf_core::KernelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// Offset is unaligned or outside the control bundle
    InvalidOffset(u32),
    /// Host tried to write an output register
    ReadOnly(u32),
    /// AP_DONE did not show up within the poll budget
    Timeout { polls: u32 },
    /// Device never went idle, so a new run could not be started
    Busy { polls: u32 },
    /// Step requested before the static parameters were written
    NotConfigured,
    Capacity,
    InvalidInput(&'static str),
    Kernel(KernelError),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::InvalidOffset(off) => write!(f, "invalid register offset {:#06x}", off),
            DeviceError::ReadOnly(off) => write!(f, "register {:#06x} is read-only", off),
            DeviceError::Timeout { polls } => {
                write!(f, "kernel did not finish after {} polls", polls)
            }
            DeviceError::Busy { polls } => write!(f, "kernel still busy after {} polls", polls),
            DeviceError::NotConfigured => write!(f, "kernel parameters not configured"),
            DeviceError::Capacity => write!(f, "capacity exceeded"),
            DeviceError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            DeviceError::Kernel(e) => write!(f, "{}", e),
        }
    }
}

impl From<KernelError> for DeviceError {
    fn from(e: KernelError) -> Self {
        DeviceError::Kernel(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Kernel(e) => Some(e),
            _ => None,
        }
    }
}

pub type DeviceResult<T, E = DeviceError> = core::result::Result<T, E>;

#[cfg(test)]
#[cfg(feature = "std")]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            format!("{}", DeviceError::InvalidOffset(0x13)),
            "invalid register offset 0x0013"
        );
        assert_eq!(format!("{}", DeviceError::ReadOnly(0x80)), "register 0x0080 is read-only");
        assert_eq!(
            format!("{}", DeviceError::Timeout { polls: 3 }),
            "kernel did not finish after 3 polls"
        );
        assert_eq!(
            format!("{}", DeviceError::Busy { polls: 2 }),
            "kernel still busy after 2 polls"
        );
        assert_eq!(format!("{}", DeviceError::Capacity), "capacity exceeded");
        assert_eq!(format!("{}", DeviceError::InvalidInput("bad")), "invalid input: bad");
        assert_eq!(
            format!("{}", DeviceError::from(KernelError::InvalidParameter("dt must be positive"))),
            "invalid parameter: dt must be positive"
        );
    }
}
