//! Invalid-parameter errors shared by every peripheral driver.
//!
//! A driver returning `Err` has not written any register: configuration is
//! validated before the first read-modify-write.

/// Errors returned by peripheral configuration calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Port G pin number outside 0..=7.
    InvalidPin(u8),
    /// Interrupt line outside 0..=26.
    InvalidLine(u8),
    /// Timer index outside 0..=5.
    InvalidTimer(u8),
    /// Prescaler group outside 0..=2.
    InvalidPrescaler(u8),
    /// Divider not wired to this timer's mux.
    InvalidDivider {
        /// Timer index the divider was requested for.
        timer: u8,
    },
    /// Pin is not configured in the mode the operation needs.
    WrongPinMode(u8),
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "invalid port G pin {pin}"),
            Self::InvalidLine(line) => write!(f, "invalid interrupt line {line}"),
            Self::InvalidTimer(timer) => write!(f, "invalid timer {timer}"),
            Self::InvalidPrescaler(group) => write!(f, "invalid prescaler group {group}"),
            Self::InvalidDivider { timer } => {
                write!(f, "divider not available on timer {timer}")
            }
            Self::WrongPinMode(pin) => write!(f, "pin {pin} is in the wrong mode"),
        }
    }
}
