//! Link trait definition
//!
//! Uses `maybe_async` to support both sync and async modes.
//! - By default, the trait is async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, the trait becomes synchronous

use crate::error::Result;
use maybe_async::maybe_async;

/// Transport and timing capabilities the driver requires
/// (sync or async depending on the `is_sync` feature)
///
/// One `Link` instance is owned exclusively by one [`Session`] for the
/// session's lifetime; it must not be shared between two active sessions.
///
/// Every fallible method reports failure as [`Error::Link`]. The core treats
/// any link failure as fatal to the in-progress operation and never retries
/// internally; retry policy, if wanted, belongs to the implementation or the
/// call site.
///
/// The ISD1700 clocks data LSB first; implementations are responsible for
/// configuring the bus accordingly.
///
/// Interrupt delivery is not part of this trait: the platform's interrupt
/// handler calls [`Session::irq_handler`] directly, from whatever execution
/// context the platform provides. If that context can run concurrently with
/// other session calls, the integrator must add mutual exclusion around the
/// session - the core performs no locking.
///
/// Debug output is not part of this trait either; the core logs through the
/// `log` facade and never lets logging affect control flow.
///
/// [`Session`]: crate::session::Session
/// [`Session::irq_handler`]: crate::session::Session::irq_handler
/// [`Error::Link`]: crate::error::Error::Link
#[maybe_async(AFIT)]
pub trait Link {
    /// Bring up the transport (bus setup, chip select)
    async fn init(&mut self) -> Result<()>;

    /// Release the transport
    async fn deinit(&mut self) -> Result<()>;

    /// Write `data` prefixed by the command byte `opcode`
    async fn write(&mut self, opcode: u8, data: &[u8]) -> Result<()>;

    /// Read `buf.len()` bytes after sending the command byte `opcode`
    async fn read(&mut self, opcode: u8, buf: &mut [u8]) -> Result<()>;

    /// Full-duplex transaction: shift out `tx` while capturing the chip's
    /// simultaneous response into `rx`
    ///
    /// `tx` and `rx` have the same length; the response to an ISD1700
    /// command occupies the same clocks as the command itself.
    async fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()>;

    /// Configure the GPIO driving the chip's reset pin
    async fn reset_init(&mut self) -> Result<()>;

    /// Release the reset GPIO
    async fn reset_deinit(&mut self) -> Result<()>;

    /// Drive the reset line high (`true`) or low (`false`)
    async fn reset_write(&mut self, level: bool) -> Result<()>;

    /// Block the calling context for the given number of milliseconds
    async fn delay_ms(&mut self, ms: u32);
}

// Blanket impl for boxed links to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl Link for alloc::boxed::Box<dyn Link + Send> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn deinit(&mut self) -> Result<()> {
        (**self).deinit()
    }

    fn write(&mut self, opcode: u8, data: &[u8]) -> Result<()> {
        (**self).write(opcode, data)
    }

    fn read(&mut self, opcode: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read(opcode, buf)
    }

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        (**self).exchange(tx, rx)
    }

    fn reset_init(&mut self) -> Result<()> {
        (**self).reset_init()
    }

    fn reset_deinit(&mut self) -> Result<()> {
        (**self).reset_deinit()
    }

    fn reset_write(&mut self, level: bool) -> Result<()> {
        (**self).reset_write(level)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
