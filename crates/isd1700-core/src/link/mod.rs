//! Link interface - the platform-supplied transport contract
//!
//! The driver core never touches hardware directly. Everything it needs
//! (SPI transactions, the reset line, millisecond delays) comes through the
//! [`Link`] trait, implemented once per target platform.

mod traits;

pub use traits::Link;
