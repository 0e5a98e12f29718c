//! ISD1700 command opcodes
//!
//! The bit-exact command set of the ISD1700 SPI protocol. Opcodes below
//! 0x40 carry no address; 0x80-0x82 are the cue commands that carry start
//! and end row addresses.

// ============================================================================
// Power and housekeeping
// ============================================================================

/// Power up the analog and control circuitry
pub const PU: u8 = 0x01;
/// Stop the current play/record/erase operation
pub const STOP: u8 = 0x02;
/// Soft reset - returns pointers and mode to the power-on state
pub const RESET: u8 = 0x03;
/// Clear the interrupt flag and the latched EOM bit
pub const CLR_INT: u8 = 0x04;
/// Read SR0/SR1 status
pub const RD_STATUS: u8 = 0x05;
/// Read the play pointer
pub const RD_PLAY_PTR: u8 = 0x06;
/// Power down
pub const PD: u8 = 0x07;
/// Read the record pointer
pub const RD_REC_PTR: u8 = 0x08;
/// Read the device ID
pub const DEVID: u8 = 0x09;

// ============================================================================
// Voice operations
// ============================================================================

/// Play the current message
pub const PLAY: u8 = 0x40;
/// Record a new message at the record pointer
pub const REC: u8 = 0x41;
/// Erase the first or last message
pub const ERASE: u8 = 0x42;
/// Erase the entire audio store
pub const G_ERASE: u8 = 0x43;
/// Advance to the next message boundary
pub const FWD: u8 = 0x48;
/// Run the chip's internal memory check
pub const CHK_MEM: u8 = 0x49;
/// Toggle the external clock input
pub const EXTCLK: u8 = 0x4A;

// ============================================================================
// Configuration and persistence
// ============================================================================

/// Read the Analog Path Configuration register
pub const RD_APC: u8 = 0x44;
/// Write APC with volume under button control
pub const WR_APC1: u8 = 0x45;
/// Write APC with volume under register control
pub const WR_APC2: u8 = 0x65;
/// Persist the configuration registers to the nonvolatile store
pub const WR_NVCFG: u8 = 0x46;
/// Reload the configuration registers from the nonvolatile store
pub const LD_NVCFG: u8 = 0x47;

// ============================================================================
// Cue commands (carry start/end row addresses)
// ============================================================================

/// Play a caller-defined span of rows
pub const SET_PLAY: u8 = 0x80;
/// Record into a caller-defined span of rows
pub const SET_REC: u8 = 0x81;
/// Erase a caller-defined span of rows
pub const SET_ERASE: u8 = 0x82;
