//! isd1700-core - Driver core for the Nuvoton ISD1700 voice recorder family
//!
//! This crate implements the register protocol and command state machine for
//! the ISD1700 single-chip voice record/playback ICs (ISD1730 through
//! ISD17240). It is designed to be `no_std` compatible for use in embedded
//! environments; the platform supplies transport, reset-line and timing
//! primitives through the [`link::Link`] trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc` and serde
//!   derives on the chip-description types)
//! - `alloc` - Enable heap allocation (boxed link trait objects)
//! - `is_sync` - Compile the driver as blocking/synchronous; without it the
//!   link trait and driver operations are async
//!
//! # Example
//!
//! ```ignore
//! use isd1700_core::{chip::DeviceType, link::Link, session::Session};
//!
//! fn record_and_play<L: Link>(link: L) -> isd1700_core::Result<()> {
//!     let mut session = Session::new(DeviceType::Isd1760, link);
//!     session.init()?;
//!     session.record()?;
//!     // ... speak ...
//!     session.stop()?;
//!     session.play()?;
//!     session.wait_idle()?;
//!     session.deinit()
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod apc;
pub mod chip;
pub mod error;
pub mod frame;
pub mod link;
pub mod protocol;
pub mod session;
pub mod status;

pub use error::{Error, Result};
