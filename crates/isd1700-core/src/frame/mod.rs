//! Register protocol codec
//!
//! Pure translation between semantic commands and the byte frames exchanged
//! with the chip. No I/O happens here: given a command this module produces
//! the exact transmit bytes, and given raw response bytes it produces typed
//! fields or a decode failure.

pub mod opcodes;

mod command;

pub use command::{decode_device_id, decode_pointer, Frame, MAX_FRAME_LEN};
