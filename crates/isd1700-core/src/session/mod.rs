//! Device session - the command state machine
//!
//! A [`Session`] owns one chip's [`Link`] exclusively and is the only way
//! the rest of an application talks to the chip. Every operation validates
//! the session state, waits for chip readiness where the protocol demands
//! it, issues the transaction through the codec and folds the resulting
//! status back into the state machine.
//!
//! State flow:
//!
//! ```text
//! Uninitialized -> Resetting -> Idle <-> {Playing, Recording, Erasing}
//!                                Idle <-> PoweredDown
//!                                 any -> Deinitialized (terminal)
//! ```
//!
//! The driver is single-context: every link call blocks the caller, and
//! operations complete in issue order. The one asynchronous entry point is
//! [`Session::irq_handler`], which the platform's interrupt dispatcher may
//! invoke from another context; guarding that with mutual exclusion is the
//! integrator's job.

use maybe_async::maybe_async;

use crate::apc::{AnalogOutput, Apc, VolumeControl};
use crate::chip::{DeviceType, VariantDescriptor};
use crate::error::{Error, Result};
use crate::frame::{opcodes, Frame};
use crate::link::Link;
use crate::protocol;
use crate::status::{Event, Mode, StatusSnapshot};

/// Settle time after power-up and soft reset
const POWER_UP_SETTLE_MS: u32 = 100;
/// Cap for ready-bit waits
const READY_TIMEOUT_MS: u32 = 1000;
/// Settle time after launching a voice operation
const LAUNCH_DELAY_MS: u32 = 500;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No hardware contact yet; only `init` is legal
    Uninitialized,
    /// Reset/identification sequence in progress
    Resetting,
    /// Powered up and ready for commands
    Idle,
    /// Playback launched
    Playing,
    /// Recording launched
    Recording,
    /// Erase launched
    Erasing,
    /// Chip powered down; volatile registers are lost
    PoweredDown,
    /// Link released; terminal
    Deinitialized,
}

/// Advisory result of a memory check
///
/// Out-of-range pointers indicate a corrupted message chain rather than a
/// failed transaction, so this is a health report, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCheck {
    /// Current play pointer
    pub play_pointer: u16,
    /// Current record pointer
    pub record_pointer: u16,
    /// Last valid row for the configured part
    pub end_address: u16,
}

impl MemoryCheck {
    /// Both pointers lie within the part's capacity
    pub fn is_healthy(&self) -> bool {
        self.play_pointer <= self.end_address && self.record_pointer <= self.end_address
    }
}

/// One chip's driver session
///
/// Create with [`Session::new`], bring the hardware up with
/// [`Session::init`], and tear down with [`Session::deinit`].
pub struct Session<L: Link> {
    link: L,
    device: DeviceType,
    variant: &'static VariantDescriptor,
    state: State,
    vol_control: VolumeControl,
    last_status: Option<StatusSnapshot>,
    eom_seen: bool,
    observer: Option<fn(Event)>,
}

impl<L: Link> Session<L> {
    /// Create a session for the given part, taking exclusive ownership of
    /// the link
    ///
    /// No hardware is touched until [`Session::init`].
    pub fn new(device: DeviceType, link: L) -> Self {
        Self {
            link,
            device,
            variant: device.descriptor(),
            state: State::Uninitialized,
            vol_control: VolumeControl::Register,
            last_status: None,
            eom_seen: false,
            observer: None,
        }
    }

    /// The configured part
    pub fn device_type(&self) -> DeviceType {
        self.device
    }

    /// Capacity and timing constants for the configured part
    pub fn variant(&self) -> &'static VariantDescriptor {
        self.variant
    }

    /// Current state-machine state
    pub fn state(&self) -> State {
        self.state
    }

    /// The most recent status snapshot, if any operation captured one
    pub fn last_status(&self) -> Option<StatusSnapshot> {
        self.last_status
    }

    /// Whether an end-of-message has been observed since the last launch
    pub fn end_of_message_seen(&self) -> bool {
        self.eom_seen
    }

    /// The configured volume-control source
    pub fn volume_control(&self) -> VolumeControl {
        self.vol_control
    }

    /// Register the observer that [`Session::irq_handler`] forwards events to
    pub fn set_observer(&mut self, observer: fn(Event)) {
        self.observer = Some(observer);
    }

    /// Remove the registered observer
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Borrow the underlying link (diagnostics and tests)
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link (diagnostics and tests)
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Give up the session and return the link
    pub fn into_link(self) -> L {
        self.link
    }

    fn notify(&self, event: Event) {
        if let Some(observer) = self.observer {
            observer(event);
        }
    }

    /// Session has been initialized and not yet torn down
    fn guard_inited(&self) -> Result<()> {
        match self.state {
            State::Uninitialized | State::Deinitialized => Err(Error::InvalidState),
            _ => Ok(()),
        }
    }

    /// Like `guard_inited`, but a powered-down chip cannot serve the call
    fn guard_responsive(&self) -> Result<()> {
        self.guard_inited()?;
        if self.state == State::PoweredDown {
            return Err(Error::NotReady);
        }
        Ok(())
    }

    /// The operation is only legal from Idle
    fn guard_idle(&self) -> Result<()> {
        self.guard_responsive()?;
        if self.state != State::Idle {
            return Err(Error::InvalidState);
        }
        Ok(())
    }
}

#[maybe_async]
impl<L: Link> Session<L> {
    /// Bring up the link and the chip
    ///
    /// Performs the hardware reset pulse, powers the chip up, waits for
    /// readiness (bounded), verifies the device ID against the configured
    /// part, soft-resets and restores the persisted configuration. On any
    /// failure the link is released again and the session stays
    /// `Uninitialized`, so `init` can simply be retried.
    pub async fn init(&mut self) -> Result<()> {
        if self.state != State::Uninitialized {
            return Err(Error::InvalidState);
        }
        self.state = State::Resetting;

        if let Err(e) = self.link.init().await {
            self.state = State::Uninitialized;
            return Err(e);
        }
        if let Err(e) = self.link.reset_init().await {
            let _ = self.link.deinit().await;
            self.state = State::Uninitialized;
            return Err(e);
        }

        match self.init_sequence().await {
            Ok(()) => {
                self.vol_control = VolumeControl::Register;
                self.eom_seen = false;
                self.state = State::Idle;
                log::info!("{} session up", self.variant.name);
                Ok(())
            }
            Err(e) => {
                log::error!("init failed: {}", e);
                let _ = self.link.deinit().await;
                let _ = self.link.reset_deinit().await;
                self.state = State::Uninitialized;
                Err(e)
            }
        }
    }

    async fn init_sequence(&mut self) -> Result<()> {
        protocol::reset_pulse(&mut self.link, self.variant.reset_settle_ms).await?;

        protocol::execute(&mut self.link, Frame::simple(opcodes::PU)).await?;
        self.link.delay_ms(POWER_UP_SETTLE_MS).await;
        let snapshot = protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;
        self.last_status = Some(snapshot);

        let id = protocol::read_device_id(&mut self.link).await?;
        if id != self.device.device_id() {
            return Err(Error::DeviceMismatch {
                expected: self.device.device_id(),
                found: id,
            });
        }

        protocol::execute(&mut self.link, Frame::simple(opcodes::RESET)).await?;
        self.link.delay_ms(POWER_UP_SETTLE_MS).await;
        protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;

        protocol::execute(&mut self.link, Frame::simple(opcodes::LD_NVCFG)).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        Ok(())
    }

    /// Tear the session down: stop anything in flight, persist the
    /// configuration, power the chip down and release the link
    ///
    /// Best effort - teardown continues past individual failures and the
    /// session always ends up `Deinitialized`; the first failure, if any,
    /// is reported.
    pub async fn deinit(&mut self) -> Result<()> {
        match self.state {
            State::Deinitialized => return Err(Error::InvalidState),
            State::Uninitialized => {
                self.state = State::Deinitialized;
                return Ok(());
            }
            _ => {}
        }

        let mut first_err = None;

        if matches!(
            self.state,
            State::Playing | State::Recording | State::Erasing
        ) {
            if let Err(e) = self.stop_sequence().await {
                first_err.get_or_insert(e);
            }
        }

        if self.state != State::PoweredDown {
            if let Err(e) = self.persist_sequence().await {
                first_err.get_or_insert(e);
            }
            if let Err(e) = protocol::execute(&mut self.link, Frame::simple(opcodes::PD)).await {
                first_err.get_or_insert(e);
            }
        }

        if let Err(e) = self.link.deinit().await {
            first_err.get_or_insert(e);
        }
        if let Err(e) = self.link.reset_deinit().await {
            first_err.get_or_insert(e);
        }

        self.state = State::Deinitialized;
        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    /// Persist the configuration and power the chip down
    ///
    /// The chip loses its volatile registers while powered down, so the
    /// current configuration is written to the NV store first; `power_up`
    /// restores it.
    pub async fn power_down(&mut self) -> Result<()> {
        self.guard_idle()?;
        self.persist_sequence().await?;
        protocol::execute(&mut self.link, Frame::simple(opcodes::PD)).await?;
        self.link.delay_ms(self.variant.command_spacing_ms).await;
        self.state = State::PoweredDown;
        Ok(())
    }

    /// Wake the chip and restore the persisted configuration
    pub async fn power_up(&mut self) -> Result<()> {
        self.guard_inited()?;
        if self.state != State::PoweredDown {
            return Err(Error::InvalidState);
        }
        protocol::execute(&mut self.link, Frame::simple(opcodes::PU)).await?;
        self.link.delay_ms(POWER_UP_SETTLE_MS).await;
        let snapshot = protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;
        self.last_status = Some(snapshot);
        protocol::execute(&mut self.link, Frame::simple(opcodes::LD_NVCFG)).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        self.state = State::Idle;
        Ok(())
    }

    /// Play the message at the play pointer
    ///
    /// Returns as soon as the chip accepts the command; completion is
    /// detected by polling [`Session::status`], blocking in
    /// [`Session::wait_idle`], or via the interrupt path.
    pub async fn play(&mut self) -> Result<()> {
        self.launch(Frame::simple(opcodes::PLAY), State::Playing).await
    }

    /// Record a new message at the record pointer
    pub async fn record(&mut self) -> Result<()> {
        self.launch(Frame::simple(opcodes::REC), State::Recording)
            .await
    }

    /// Erase the first or last message
    pub async fn erase_message(&mut self) -> Result<()> {
        self.launch(Frame::simple(opcodes::ERASE), State::Erasing)
            .await
    }

    /// Erase the entire audio store
    pub async fn global_erase(&mut self) -> Result<()> {
        self.launch(Frame::simple(opcodes::G_ERASE), State::Erasing)
            .await
    }

    /// Play a caller-defined span of rows
    pub async fn play_span(&mut self, start: u16, end: u16) -> Result<()> {
        self.launch_cue(opcodes::SET_PLAY, start, end, State::Playing)
            .await
    }

    /// Record into a caller-defined span of rows
    pub async fn record_span(&mut self, start: u16, end: u16) -> Result<()> {
        self.launch_cue(opcodes::SET_REC, start, end, State::Recording)
            .await
    }

    /// Erase a caller-defined span of rows
    pub async fn erase_span(&mut self, start: u16, end: u16) -> Result<()> {
        self.launch_cue(opcodes::SET_ERASE, start, end, State::Erasing)
            .await
    }

    async fn launch_cue(&mut self, opcode: u8, start: u16, end: u16, next: State) -> Result<()> {
        self.guard_idle()?;
        // Validate before any transport transaction is issued
        if start >= end {
            return Err(Error::InvalidParameter);
        }
        if end > self.variant.end_address {
            return Err(Error::OutOfRange);
        }
        self.launch(Frame::cue(opcode, self.variant, start, end), next)
            .await
    }

    /// Common launch path: ready-wait, issue, settle, accept-check
    async fn launch(&mut self, frame: Frame, next: State) -> Result<()> {
        self.guard_idle()?;
        protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;
        protocol::execute(&mut self.link, frame).await?;
        // CommandError from confirm leaves the session in Idle, which is
        // where it already is
        let snapshot = protocol::confirm(&mut self.link, LAUNCH_DELAY_MS).await?;
        self.last_status = Some(snapshot);
        if next == State::Recording && snapshot.is_full() {
            return Err(Error::StorageFull);
        }
        self.eom_seen = false;
        self.state = next;
        Ok(())
    }

    /// Stop the in-flight play/record/erase and wait for readiness
    pub async fn stop(&mut self) -> Result<()> {
        self.guard_responsive()?;
        if !matches!(
            self.state,
            State::Playing | State::Recording | State::Erasing
        ) {
            return Err(Error::InvalidState);
        }
        self.stop_sequence().await
    }

    async fn stop_sequence(&mut self) -> Result<()> {
        protocol::execute(&mut self.link, Frame::simple(opcodes::STOP)).await?;
        match protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await
        {
            Ok(snapshot) => {
                self.last_status = Some(snapshot);
                self.state = State::Idle;
                Ok(())
            }
            Err(Error::CommandError) => {
                self.state = State::Idle;
                Err(Error::CommandError)
            }
            Err(e) => Err(e),
        }
    }

    /// Advance playback to the next message boundary
    ///
    /// Only meaningful after an end-of-message has been observed; fails
    /// with [`Error::InvalidState`] otherwise.
    pub async fn next(&mut self) -> Result<()> {
        self.guard_responsive()?;
        if self.state != State::Playing || !self.eom_seen {
            return Err(Error::InvalidState);
        }
        protocol::execute(&mut self.link, Frame::simple(opcodes::FWD)).await?;
        match protocol::confirm(&mut self.link, LAUNCH_DELAY_MS).await {
            Ok(snapshot) => {
                self.last_status = Some(snapshot);
                self.eom_seen = false;
                Ok(())
            }
            Err(Error::CommandError) => {
                self.state = State::Idle;
                Err(Error::CommandError)
            }
            Err(e) => Err(e),
        }
    }

    /// Read a status snapshot and fold it into the state machine
    ///
    /// Latches an observed end-of-message, detects completion of an
    /// in-flight operation (chip ready again, no mode bit set) and surfaces
    /// a chip-reported command error as [`Error::CommandError`] with the
    /// session back in Idle. The interrupt flag is *not* cleared here; use
    /// [`Session::clear_interrupt`] or [`Session::irq_handler`].
    pub async fn status(&mut self) -> Result<StatusSnapshot> {
        self.guard_responsive()?;
        let snapshot = protocol::read_status(&mut self.link).await?;
        self.last_status = Some(snapshot);

        if snapshot.is_end_of_message() {
            self.eom_seen = true;
        }
        let active = matches!(
            self.state,
            State::Playing | State::Recording | State::Erasing
        );
        if snapshot.is_command_error() {
            if active {
                self.state = State::Idle;
            }
            return Err(Error::CommandError);
        }
        if active && snapshot.is_ready() && snapshot.active_mode()? == Mode::Idle {
            self.state = State::Idle;
        }
        Ok(snapshot)
    }

    /// Block until the in-flight operation completes
    ///
    /// The wait is bounded: erases are capped by the variant's erase
    /// timeout, play/record by the part's full record duration plus margin.
    /// From Idle this is a no-op.
    pub async fn wait_idle(&mut self) -> Result<()> {
        self.guard_responsive()?;
        let timeout_ms = match self.state {
            State::Idle => return Ok(()),
            State::Erasing => self.variant.global_erase_timeout_ms,
            State::Playing | State::Recording => {
                self.variant.duration_secs as u32 * 1000 + READY_TIMEOUT_MS
            }
            _ => return Err(Error::InvalidState),
        };
        match protocol::wait_ready(&mut self.link, self.variant.command_spacing_ms, timeout_ms)
            .await
        {
            Ok(snapshot) => {
                // Playback that ran to completion ended at a message boundary
                if self.state == State::Playing {
                    self.eom_seen = true;
                }
                self.last_status = Some(snapshot);
                self.state = State::Idle;
                Ok(())
            }
            Err(Error::CommandError) => {
                self.state = State::Idle;
                Err(Error::CommandError)
            }
            Err(e) => Err(e),
        }
    }

    /// Soft-reset the chip and return to Idle
    pub async fn reset(&mut self) -> Result<()> {
        self.guard_responsive()?;
        protocol::execute(&mut self.link, Frame::simple(opcodes::RESET)).await?;
        self.link.delay_ms(POWER_UP_SETTLE_MS).await;
        let snapshot = protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;
        self.last_status = Some(snapshot);
        self.eom_seen = false;
        self.state = State::Idle;
        Ok(())
    }

    /// Hardware-reset the chip via the reset line and bring it back to Idle
    ///
    /// Recovery path of last resort: pulses the reset pin, powers the chip
    /// back up and reloads the persisted configuration. If the recovery
    /// sequence fails partway, the chip has been reset but not brought up,
    /// so the session lands in `PoweredDown` and `power_up` can retry.
    pub async fn hardware_reset(&mut self) -> Result<()> {
        self.guard_inited()?;
        self.state = State::Resetting;
        match self.hardware_reset_sequence().await {
            Ok(()) => {
                self.eom_seen = false;
                self.state = State::Idle;
                Ok(())
            }
            Err(e) => {
                self.state = State::PoweredDown;
                Err(e)
            }
        }
    }

    async fn hardware_reset_sequence(&mut self) -> Result<()> {
        protocol::reset_pulse(&mut self.link, self.variant.reset_settle_ms).await?;
        protocol::execute(&mut self.link, Frame::simple(opcodes::PU)).await?;
        self.link.delay_ms(POWER_UP_SETTLE_MS).await;
        let snapshot = protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;
        self.last_status = Some(snapshot);
        protocol::execute(&mut self.link, Frame::simple(opcodes::LD_NVCFG)).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        Ok(())
    }

    /// Clear the interrupt flag and the latched EOM bit
    pub async fn clear_interrupt(&mut self) -> Result<()> {
        self.guard_inited()?;
        protocol::clear_interrupt(&mut self.link).await
    }

    /// Interrupt service entry point
    ///
    /// Call from the platform's interrupt dispatcher when the chip's INT
    /// line asserts. Reads status, clears the interrupt, updates the state
    /// machine and forwards the decoded [`Event`]s to the registered
    /// observer. If this can run concurrently with other session calls the
    /// integrator must serialize access; the core performs no locking.
    pub async fn irq_handler(&mut self) -> Result<()> {
        self.guard_responsive()?;
        let snapshot = protocol::read_status(&mut self.link).await?;
        self.last_status = Some(snapshot);
        protocol::clear_interrupt(&mut self.link).await?;

        let active = matches!(
            self.state,
            State::Playing | State::Recording | State::Erasing
        );

        if snapshot.is_end_of_message() {
            self.eom_seen = true;
            self.notify(Event::EndOfMessage);
        }
        if snapshot.is_full() {
            self.notify(Event::StorageFull);
        }
        if snapshot.is_command_error() {
            if active {
                self.state = State::Idle;
            }
            self.notify(Event::CommandError);
        } else if snapshot.is_interrupt_pending() {
            if active && snapshot.is_ready() && snapshot.active_mode()? == Mode::Idle {
                self.state = State::Idle;
            }
            self.notify(Event::OperationDone);
        }
        Ok(())
    }

    /// Run the chip's memory check and validate both pointers
    ///
    /// Advisory: returns a [`MemoryCheck`] health report instead of failing
    /// on out-of-range pointers.
    pub async fn check_memory(&mut self) -> Result<MemoryCheck> {
        self.guard_idle()?;
        protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;
        protocol::execute(&mut self.link, Frame::simple(opcodes::CHK_MEM)).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        let play_pointer =
            protocol::read_pointer(&mut self.link, opcodes::RD_PLAY_PTR, self.variant).await?;
        let record_pointer =
            protocol::read_pointer(&mut self.link, opcodes::RD_REC_PTR, self.variant).await?;
        Ok(MemoryCheck {
            play_pointer,
            record_pointer,
            end_address: self.variant.end_address,
        })
    }

    /// Read the play pointer
    pub async fn read_play_pointer(&mut self) -> Result<u16> {
        self.guard_responsive()?;
        protocol::read_pointer(&mut self.link, opcodes::RD_PLAY_PTR, self.variant).await
    }

    /// Read the record pointer
    pub async fn read_record_pointer(&mut self) -> Result<u16> {
        self.guard_responsive()?;
        protocol::read_pointer(&mut self.link, opcodes::RD_REC_PTR, self.variant).await
    }

    /// Read the device ID code from the chip
    pub async fn device_id(&mut self) -> Result<u8> {
        self.guard_responsive()?;
        protocol::read_device_id(&mut self.link).await
    }

    /// Persist the volatile configuration registers to the NV store
    pub async fn write_to_nv(&mut self) -> Result<()> {
        self.guard_idle()?;
        self.persist_sequence().await
    }

    /// Reload the configuration registers from the NV store
    pub async fn load_from_nv(&mut self) -> Result<()> {
        self.guard_idle()?;
        protocol::execute(&mut self.link, Frame::simple(opcodes::LD_NVCFG)).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        Ok(())
    }

    async fn persist_sequence(&mut self) -> Result<()> {
        protocol::execute(&mut self.link, Frame::simple(opcodes::WR_NVCFG)).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        // NV programming holds RDY until it finishes
        protocol::wait_ready(
            &mut self.link,
            self.variant.command_spacing_ms,
            READY_TIMEOUT_MS,
        )
        .await?;
        Ok(())
    }

    /// Toggle the external clock input on or off
    pub async fn toggle_extern_clock(&mut self) -> Result<()> {
        self.guard_idle()?;
        protocol::execute(&mut self.link, Frame::simple(opcodes::EXTCLK)).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        Ok(())
    }

    /// Write a raw command frame, bypassing semantic validation
    ///
    /// Escape hatch, unsafe by contract: no opcode or operand checking is
    /// performed beyond the session being initialized. The caller is
    /// responsible for chip-level correctness.
    pub async fn reg_write(&mut self, opcode: u8, data: &[u8]) -> Result<()> {
        self.guard_inited()?;
        self.link.write(opcode, data).await
    }

    /// Read raw bytes for a command, bypassing semantic validation
    ///
    /// Escape hatch, unsafe by contract, like [`Session::reg_write`].
    pub async fn reg_read(&mut self, opcode: u8, buf: &mut [u8]) -> Result<()> {
        self.guard_inited()?;
        self.link.read(opcode, buf).await
    }

    // ------------------------------------------------------------------
    // Configuration - read/modify/write of the APC register. None of these
    // persist to NV; that is explicit (`write_to_nv`) or implicit in
    // `power_down`.
    // ------------------------------------------------------------------

    async fn read_config(&mut self) -> Result<Apc> {
        self.guard_idle()?;
        let apc = protocol::read_apc(&mut self.link).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        Ok(apc)
    }

    async fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Apc) -> Result<()>,
    {
        let mut apc = self.read_config().await?;
        f(&mut apc)?;
        protocol::write_apc(&mut self.link, self.vol_control, apc).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        Ok(())
    }

    /// Set the playback attenuation, 0 (loudest) to 7 (softest)
    ///
    /// Values above 7 fail with [`Error::InvalidParameter`] before any
    /// transaction is issued.
    pub async fn set_volume(&mut self, vol: u8) -> Result<()> {
        if vol > 7 {
            return Err(Error::InvalidParameter);
        }
        self.update_config(|apc| apc.set_volume(vol)).await
    }

    /// Read the playback attenuation
    pub async fn volume(&mut self) -> Result<u8> {
        Ok(self.read_config().await?.volume())
    }

    /// Select the analog output pin pair
    pub async fn set_analog_output(&mut self, output: AnalogOutput) -> Result<()> {
        self.update_config(|apc| {
            apc.set_analog_output(output);
            Ok(())
        })
        .await
    }

    /// Read the selected analog output pin pair
    pub async fn analog_output(&mut self) -> Result<AnalogOutput> {
        Ok(self.read_config().await?.analog_output())
    }

    /// Route the ANA_IN monitor path to the output
    pub async fn set_monitor_input(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_monitor_input(enable);
            Ok(())
        })
        .await
    }

    /// Read the monitor input setting
    pub async fn monitor_input(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.monitor_input())
    }

    /// Mix the ANA_IN signal into recordings
    pub async fn set_mix_input(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_mix_input(enable);
            Ok(())
        })
        .await
    }

    /// Read the mix input setting
    pub async fn mix_input(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.mix_input())
    }

    /// Enable or disable sound-effect editing
    pub async fn set_sound_effect_editing(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_sound_effect_editing(enable);
            Ok(())
        })
        .await
    }

    /// Read the sound-effect editing setting
    pub async fn sound_effect_editing(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.sound_effect_editing())
    }

    /// Enable or disable SPI feed-through to the analog output
    pub async fn set_spi_feedthrough(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_spi_feedthrough(enable);
            Ok(())
        })
        .await
    }

    /// Read the SPI feed-through setting
    pub async fn spi_feedthrough(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.spi_feedthrough())
    }

    /// Enable or disable the class-D PWM speaker driver
    pub async fn set_pwm_speaker(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_pwm_speaker(enable);
            Ok(())
        })
        .await
    }

    /// Read the PWM speaker setting
    pub async fn pwm_speaker(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.pwm_speaker())
    }

    /// Power the analog output together with the chip
    pub async fn set_power_up_analog_output(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_power_up_analog_output(enable);
            Ok(())
        })
        .await
    }

    /// Read the power-up analog output setting
    pub async fn power_up_analog_output(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.power_up_analog_output())
    }

    /// Enable or disable the low-supply voltage alert
    pub async fn set_v_alert(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_v_alert(enable);
            Ok(())
        })
        .await
    }

    /// Read the voltage alert setting
    pub async fn v_alert(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.v_alert())
    }

    /// Stop playback at each end-of-message marker
    pub async fn set_eom_stop(&mut self, enable: bool) -> Result<()> {
        self.update_config(|apc| {
            apc.set_eom_stop(enable);
            Ok(())
        })
        .await
    }

    /// Read the end-of-message stop setting
    pub async fn eom_stop(&mut self) -> Result<bool> {
        Ok(self.read_config().await?.eom_stop())
    }

    /// Select what controls the playback volume
    ///
    /// The selection is carried by the APC write opcode, so the current
    /// register value is rewritten through the newly selected opcode.
    pub async fn set_volume_control(&mut self, control: VolumeControl) -> Result<()> {
        let apc = self.read_config().await?;
        self.vol_control = control;
        protocol::write_apc(&mut self.link, control, apc).await?;
        protocol::confirm(&mut self.link, self.variant.command_spacing_ms).await?;
        Ok(())
    }
}
