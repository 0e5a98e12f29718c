//! ISD1700 transaction sequences
//!
//! Uses `maybe_async` to support both sync and async modes:
//! - With the `is_sync` feature: blocking/synchronous
//! - Without: async (for Embassy, tokio)
//!
//! Every function here is one short, self-contained exchange; state-machine
//! decisions (which command is legal when) live in the session.

use maybe_async::maybe_async;

use crate::apc::{Apc, VolumeControl};
use crate::chip::VariantDescriptor;
use crate::error::{Error, Result};
use crate::frame::{self, opcodes, Frame};
use crate::link::Link;
use crate::status::StatusSnapshot;

/// Issue a command frame with no response phase
#[maybe_async]
pub async fn execute<L: Link + ?Sized>(link: &mut L, frame: Frame) -> Result<()> {
    link.write(frame.opcode(), frame.payload()).await
}

/// Run a full-duplex frame, capturing the chip's simultaneous response
///
/// `rx` must be exactly as long as the frame.
#[maybe_async]
pub async fn transfer<L: Link + ?Sized>(link: &mut L, frame: Frame, rx: &mut [u8]) -> Result<()> {
    link.exchange(frame.bytes(), rx).await
}

/// Read one status snapshot
#[maybe_async]
pub async fn read_status<L: Link + ?Sized>(link: &mut L) -> Result<StatusSnapshot> {
    let mut rx = [0u8; 3];
    transfer(link, Frame::status_read(), &mut rx).await?;
    StatusSnapshot::parse(&rx)
}

/// Clear the interrupt flag and the latched EOM bit
#[maybe_async]
pub async fn clear_interrupt<L: Link + ?Sized>(link: &mut L) -> Result<()> {
    execute(link, Frame::simple(opcodes::CLR_INT)).await
}

/// Read the device ID code
#[maybe_async]
pub async fn read_device_id<L: Link + ?Sized>(link: &mut L) -> Result<u8> {
    let mut rx = [0u8; 3];
    transfer(link, Frame::device_id_read(), &mut rx).await?;
    frame::decode_device_id(&rx)
}

/// Read the play or record pointer (`opcode` selects which)
#[maybe_async]
pub async fn read_pointer<L: Link + ?Sized>(
    link: &mut L,
    opcode: u8,
    variant: &VariantDescriptor,
) -> Result<u16> {
    let mut rx = [0u8; 4];
    transfer(link, Frame::pointer_read(opcode), &mut rx).await?;
    frame::decode_pointer(&rx, variant)
}

/// Read the APC configuration register
#[maybe_async]
pub async fn read_apc<L: Link + ?Sized>(link: &mut L) -> Result<Apc> {
    let mut rx = [0u8; 4];
    transfer(link, Frame::apc_read(), &mut rx).await?;
    Apc::parse(&rx)
}

/// Write the APC configuration register
///
/// The opcode selects the volume-control source as a side effect, so the
/// caller's configured [`VolumeControl`] picks it.
#[maybe_async]
pub async fn write_apc<L: Link + ?Sized>(
    link: &mut L,
    control: VolumeControl,
    apc: Apc,
) -> Result<()> {
    let mut rx = [0u8; 3];
    transfer(
        link,
        Frame::apc_write(control.write_opcode(), apc.raw()),
        &mut rx,
    )
    .await
}

/// Let the command settle, then check that the chip accepted it
///
/// Waits one command-spacing interval, reads status once and reports
/// [`Error::CommandError`] if the chip rejected the command.
#[maybe_async]
pub async fn confirm<L: Link + ?Sized>(link: &mut L, spacing_ms: u32) -> Result<StatusSnapshot> {
    link.delay_ms(spacing_ms).await;
    let snapshot = read_status(link).await?;
    if snapshot.is_command_error() {
        log::debug!("chip rejected command (SR0 0x{:04X})", snapshot.raw_sr0);
        return Err(Error::CommandError);
    }
    Ok(snapshot)
}

/// Wait for the ready bit with a bounded poll
///
/// Polls status every `poll_ms` until RDY is set, the chip reports a
/// command error, or the capped iteration count derived from `timeout_ms`
/// runs out ([`Error::Timeout`]). A latched EOM/INT seen while waiting is
/// cleared so it cannot mask the ready transition.
#[maybe_async]
pub async fn wait_ready<L: Link + ?Sized>(
    link: &mut L,
    poll_ms: u32,
    timeout_ms: u32,
) -> Result<StatusSnapshot> {
    let max_polls = if poll_ms > 0 {
        (timeout_ms / poll_ms).max(1)
    } else {
        timeout_ms.max(1)
    };

    for _ in 0..max_polls {
        let snapshot = read_status(link).await?;
        if snapshot.is_command_error() {
            return Err(Error::CommandError);
        }
        if snapshot.is_end_of_message() || snapshot.is_interrupt_pending() {
            clear_interrupt(link).await?;
        }
        if snapshot.is_ready() {
            return Ok(snapshot);
        }
        link.delay_ms(poll_ms).await;
    }

    log::warn!("ready wait exceeded {} ms", timeout_ms);
    Err(Error::Timeout)
}

/// Pulse the reset line: assert, settle, release, settle
#[maybe_async]
pub async fn reset_pulse<L: Link + ?Sized>(link: &mut L, settle_ms: u32) -> Result<()> {
    link.reset_write(true).await?;
    link.delay_ms(settle_ms).await;
    link.reset_write(false).await?;
    link.delay_ms(settle_ms).await;
    Ok(())
}
