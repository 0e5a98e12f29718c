//! Error types for isd1700-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Transport errors
    /// Link transaction failed (SPI transfer, reset line or link setup)
    Link,
    /// A bounded readiness or settle wait exceeded its cap
    Timeout,
    /// Chip response was shorter or differently shaped than the command expects
    ShortResponse,

    // Chip-reported errors
    /// Chip status reports the command-error bit after a command was issued
    CommandError,
    /// Chip status reports the full bit - recording storage is exhausted
    StorageFull,
    /// Device ID read from the chip does not match the configured part
    DeviceMismatch {
        /// Device ID expected for the configured part
        expected: u8,
        /// Device ID actually reported by the chip
        found: u8,
    },
    /// Status decoded to a contradictory combination (e.g. two exclusive
    /// mode bits set at once)
    ProtocolInconsistency,

    // Caller errors
    /// Operation attempted from a session state that forbids it
    InvalidState,
    /// Operation attempted while the chip is powered down
    NotReady,
    /// Configuration value outside the enumerated legal set
    InvalidParameter,
    /// Address or region beyond the capacity of the configured part
    OutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => write!(f, "link transaction failed"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::ShortResponse => write!(f, "chip response too short"),
            Self::CommandError => write!(f, "chip reported command error"),
            Self::StorageFull => write!(f, "recording storage is full"),
            Self::DeviceMismatch { expected, found } => {
                write!(
                    f,
                    "device ID mismatch: expected 0x{:02X}, found 0x{:02X}",
                    expected, found
                )
            }
            Self::ProtocolInconsistency => write!(f, "contradictory status bits"),
            Self::InvalidState => write!(f, "operation not allowed in current state"),
            Self::NotReady => write!(f, "chip is powered down"),
            Self::InvalidParameter => write!(f, "parameter outside legal range"),
            Self::OutOfRange => write!(f, "address beyond chip capacity"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
