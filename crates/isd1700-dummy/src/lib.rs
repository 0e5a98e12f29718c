//! isd1700-dummy - In-memory ISD1700 chip emulator for testing
//!
//! This crate provides a dummy [`Link`] implementation that emulates an
//! ISD1700 chip in memory: status words, the APC register and its
//! nonvolatile shadow, play/record pointers and the command state machine.
//! It's useful for testing and development without real hardware, and it is
//! what the driver's state-machine tests run against.
//!
//! Audio content is not modeled - a "recording" only moves the record
//! pointer - because the driver core never touches sample data.

#![cfg_attr(not(feature = "std"), no_std)]

use isd1700_core::apc::Apc;
use isd1700_core::chip::{DeviceType, VariantDescriptor};
use isd1700_core::error::{Error, Result};
use isd1700_core::frame::opcodes;
use isd1700_core::link::Link;

/// What the emulated chip is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChipMode {
    Idle,
    Playing,
    Recording,
    Erasing,
}

/// Configuration for the dummy chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Which part to emulate (decides device ID and capacity)
    pub device: DeviceType,
    /// Status reads an operation stays active for before completing
    pub op_polls: u32,
    /// Rows the record pointer advances per completed recording
    pub record_advance: u16,
}

impl DummyConfig {
    /// Configuration for the given part with default pacing
    pub fn for_device(device: DeviceType) -> Self {
        let rows = device.descriptor().rows();
        Self {
            device,
            op_polls: 2,
            record_advance: rows / 2,
        }
    }
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self::for_device(DeviceType::Isd1760)
    }
}

/// Emulated ISD1700 chip behind the [`Link`] trait
pub struct DummyChip {
    config: DummyConfig,
    variant: &'static VariantDescriptor,

    // Chip state
    powered: bool,
    mode: ChipMode,
    countdown: u32,
    apc: u16,
    nv_apc: u16,
    ext_clk: bool,
    nv_ext_clk: bool,
    play_ptr: u16,
    rec_ptr: u16,
    cmd_err: bool,
    full: bool,
    int_flag: bool,
    eom_flag: bool,

    // Bookkeeping and test hooks
    transactions: usize,
    play_commands: usize,
    record_commands: usize,
    fail_link: bool,
    reject_next: bool,
    hold_busy: bool,
    force_sr1: Option<u8>,
}

impl DummyChip {
    /// Create a dummy chip with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let variant = config.device.descriptor();
        let nv = Apc::default().raw();
        Self {
            config,
            variant,
            powered: false,
            mode: ChipMode::Idle,
            countdown: 0,
            apc: nv,
            nv_apc: nv,
            ext_clk: false,
            nv_ext_clk: false,
            play_ptr: 0,
            rec_ptr: 0,
            cmd_err: false,
            full: false,
            int_flag: false,
            eom_flag: false,
            transactions: 0,
            play_commands: 0,
            record_commands: 0,
            fail_link: false,
            reject_next: false,
            hold_busy: false,
            force_sr1: None,
        }
    }

    /// Create a dummy chip emulating the given part
    pub fn for_device(device: DeviceType) -> Self {
        Self::new(DummyConfig::for_device(device))
    }

    /// Current APC register contents
    pub fn apc(&self) -> Apc {
        Apc::from_raw(self.apc)
    }

    /// Nonvolatile APC shadow contents
    pub fn nv_apc(&self) -> Apc {
        Apc::from_raw(self.nv_apc)
    }

    /// External clock selection
    pub fn extern_clock(&self) -> bool {
        self.ext_clk
    }

    /// Total link transactions seen (writes, reads and exchanges)
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// PLAY/SET_PLAY commands seen
    pub fn play_commands(&self) -> usize {
        self.play_commands
    }

    /// REC/SET_REC commands seen
    pub fn record_commands(&self) -> usize {
        self.record_commands
    }

    /// Chip power state
    pub fn powered(&self) -> bool {
        self.powered
    }

    /// Fail every link call with `Error::Link`
    pub fn set_fail_link(&mut self, fail: bool) {
        self.fail_link = fail;
    }

    /// Reject the next command with the CMD_ERR status bit
    pub fn set_reject_next(&mut self, reject: bool) {
        self.reject_next = reject;
    }

    /// Keep the ready bit clear regardless of chip state
    pub fn set_hold_busy(&mut self, busy: bool) {
        self.hold_busy = busy;
    }

    /// Latch the CMD_ERR status bit directly
    pub fn force_command_error(&mut self) {
        self.cmd_err = true;
    }

    /// Latch the EOM and INT status bits, as the chip does at a message
    /// boundary
    pub fn signal_end_of_message(&mut self) {
        self.eom_flag = true;
        self.int_flag = true;
    }

    /// Override the SR1 byte returned by status reads (protocol-anomaly
    /// injection)
    pub fn force_sr1(&mut self, sr1: Option<u8>) {
        self.force_sr1 = sr1;
    }

    /// Move the record pointer (pointer-corruption injection)
    pub fn set_record_pointer(&mut self, ptr: u16) {
        self.rec_ptr = ptr;
    }

    fn ready(&self) -> bool {
        self.powered && self.mode == ChipMode::Idle && !self.hold_busy
    }

    fn tick(&mut self) {
        if self.mode == ChipMode::Idle || self.hold_busy {
            return;
        }
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.complete_operation();
        }
    }

    fn complete_operation(&mut self) {
        match self.mode {
            ChipMode::Playing => {
                self.eom_flag = true;
            }
            ChipMode::Recording => {
                self.rec_ptr = self
                    .rec_ptr
                    .saturating_add(self.config.record_advance)
                    .min(self.variant.end_address);
                if self.rec_ptr >= self.variant.end_address {
                    self.full = true;
                }
            }
            ChipMode::Erasing => {
                self.play_ptr = 0;
                self.rec_ptr = 0;
                self.full = false;
            }
            ChipMode::Idle => {}
        }
        self.int_flag = true;
        self.mode = ChipMode::Idle;
    }

    fn start_operation(&mut self, mode: ChipMode) {
        if !self.ready() {
            self.cmd_err = true;
            return;
        }
        self.mode = mode;
        self.countdown = self.config.op_polls.max(1);
    }

    fn power_on_reset(&mut self) {
        self.powered = false;
        self.mode = ChipMode::Idle;
        self.apc = self.nv_apc;
        self.ext_clk = self.nv_ext_clk;
        self.play_ptr = 0;
        self.rec_ptr = 0;
        self.cmd_err = false;
        self.full = false;
        self.int_flag = false;
        self.eom_flag = false;
    }

    fn sr0(&self) -> u16 {
        let mut sr0 = 0u16;
        if self.cmd_err {
            sr0 |= 1 << 0;
        }
        if self.full {
            sr0 |= 1 << 1;
        }
        if self.powered {
            sr0 |= 1 << 2;
        }
        if self.eom_flag {
            sr0 |= 1 << 3;
        }
        if self.int_flag {
            sr0 |= 1 << 4;
        }
        sr0
    }

    fn sr1(&self) -> u8 {
        if let Some(forced) = self.force_sr1 {
            return forced;
        }
        let mut sr1 = 0u8;
        if self.ready() {
            sr1 |= 1 << 0;
        }
        match self.mode {
            ChipMode::Erasing => sr1 |= 1 << 1,
            ChipMode::Playing => sr1 |= 1 << 2,
            ChipMode::Recording => sr1 |= 1 << 3,
            ChipMode::Idle => {}
        }
        sr1
    }

    fn span_from_cue(data: &[u8]) -> (u16, u16) {
        // Cue payload: pad, start lo/hi, end lo/hi, pad. Short payloads can
        // arrive through the raw register path; treat them as a zero span.
        if data.len() < 5 {
            return (0, 0);
        }
        let start = ((data[2] as u16) << 8) | data[1] as u16;
        let end = ((data[4] as u16) << 8) | data[3] as u16;
        (start, end)
    }

    fn handle_command(&mut self, opcode: u8, data: &[u8]) {
        log::trace!("command 0x{:02X}", opcode);
        if opcode != opcodes::CLR_INT {
            self.cmd_err = false;
            if self.reject_next {
                self.reject_next = false;
                self.cmd_err = true;
                return;
            }
        }
        match opcode {
            opcodes::PU => self.powered = true,
            opcodes::PD => {
                // Volatile registers are lost while powered down
                self.powered = false;
                self.mode = ChipMode::Idle;
                self.apc = Apc::default().raw();
                self.ext_clk = false;
            }
            opcodes::STOP => {
                if self.mode != ChipMode::Idle {
                    self.mode = ChipMode::Idle;
                    self.int_flag = true;
                }
            }
            opcodes::RESET => {
                let powered = self.powered;
                self.power_on_reset();
                self.powered = powered;
            }
            opcodes::CLR_INT => {
                self.int_flag = false;
                self.eom_flag = false;
            }
            opcodes::PLAY => {
                self.play_commands += 1;
                self.start_operation(ChipMode::Playing);
            }
            opcodes::REC => {
                self.record_commands += 1;
                if self.full {
                    return;
                }
                self.start_operation(ChipMode::Recording);
            }
            opcodes::ERASE | opcodes::G_ERASE => self.start_operation(ChipMode::Erasing),
            opcodes::FWD => {
                if self.mode == ChipMode::Playing || self.ready() {
                    self.play_ptr = self.play_ptr.saturating_add(1).min(self.variant.end_address);
                    self.eom_flag = false;
                } else {
                    self.cmd_err = true;
                }
            }
            opcodes::CHK_MEM => {}
            opcodes::EXTCLK => self.ext_clk = !self.ext_clk,
            opcodes::WR_NVCFG => {
                self.nv_apc = self.apc;
                self.nv_ext_clk = self.ext_clk;
            }
            opcodes::LD_NVCFG => {
                self.apc = self.nv_apc;
                self.ext_clk = self.nv_ext_clk;
            }
            opcodes::SET_PLAY => {
                self.play_commands += 1;
                let (start, _) = Self::span_from_cue(data);
                self.play_ptr = start;
                self.start_operation(ChipMode::Playing);
            }
            opcodes::SET_REC => {
                self.record_commands += 1;
                let (start, _) = Self::span_from_cue(data);
                if self.full {
                    return;
                }
                self.rec_ptr = start;
                self.start_operation(ChipMode::Recording);
            }
            opcodes::SET_ERASE => {
                let _ = Self::span_from_cue(data);
                self.start_operation(ChipMode::Erasing);
            }
            _ => self.cmd_err = true,
        }
    }
}

impl Link for DummyChip {
    fn init(&mut self) -> Result<()> {
        if self.fail_link {
            return Err(Error::Link);
        }
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, opcode: u8, data: &[u8]) -> Result<()> {
        if self.fail_link {
            return Err(Error::Link);
        }
        self.transactions += 1;
        self.handle_command(opcode, data);
        Ok(())
    }

    fn read(&mut self, _opcode: u8, buf: &mut [u8]) -> Result<()> {
        if self.fail_link {
            return Err(Error::Link);
        }
        self.transactions += 1;
        buf.fill(0);
        Ok(())
    }

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        if self.fail_link {
            return Err(Error::Link);
        }
        self.transactions += 1;
        rx.fill(0);
        match tx[0] {
            opcodes::RD_STATUS => {
                self.tick();
                let sr0 = self.sr0();
                rx[0] = (sr0 >> 8) as u8;
                rx[1] = sr0 as u8;
                rx[2] = self.sr1();
                // CMD_ERR describes the command before this read; the read
                // itself is a valid command, so the bit clears with it
                self.cmd_err = false;
            }
            opcodes::DEVID => {
                rx[2] = self.config.device.device_id() << 3;
            }
            opcodes::RD_PLAY_PTR => {
                rx[2] = self.play_ptr as u8;
                rx[3] = (self.play_ptr >> 8) as u8;
            }
            opcodes::RD_REC_PTR => {
                rx[2] = self.rec_ptr as u8;
                rx[3] = (self.rec_ptr >> 8) as u8;
            }
            opcodes::RD_APC => {
                rx[2] = self.apc as u8;
                rx[3] = (self.apc >> 8) as u8;
            }
            opcodes::WR_APC1 | opcodes::WR_APC2 => {
                self.cmd_err = false;
                if self.reject_next {
                    self.reject_next = false;
                    self.cmd_err = true;
                } else {
                    self.apc = (((tx[2] & 0x0F) as u16) << 8) | tx[1] as u16;
                }
            }
            _ => self.cmd_err = true,
        }
        Ok(())
    }

    fn reset_init(&mut self) -> Result<()> {
        Ok(())
    }

    fn reset_deinit(&mut self) -> Result<()> {
        Ok(())
    }

    fn reset_write(&mut self, level: bool) -> Result<()> {
        if self.fail_link {
            return Err(Error::Link);
        }
        if level {
            self.power_on_reset();
        }
        Ok(())
    }

    fn delay_ms(&mut self, _ms: u32) {
        // No delay needed for in-memory operation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isd1700_core::apc::{AnalogOutput, VolumeControl};
    use isd1700_core::protocol;
    use isd1700_core::session::{Session, State};
    use isd1700_core::status::Event;
    use std::sync::atomic::{AtomicU8, Ordering};

    fn ready_chip(device: DeviceType) -> DummyChip {
        let mut chip = DummyChip::for_device(device);
        chip.powered = true;
        chip
    }

    fn session(device: DeviceType) -> Session<DummyChip> {
        let mut s = Session::new(device, DummyChip::for_device(device));
        s.init().unwrap();
        s
    }

    // ------------------------------------------------------------------
    // Protocol-level tests against the bare emulator
    // ------------------------------------------------------------------

    #[test]
    fn read_device_id() {
        let mut chip = ready_chip(DeviceType::Isd17240);
        let id = protocol::read_device_id(&mut chip).unwrap();
        assert_eq!(id, 0x1C);
    }

    #[test]
    fn apc_write_read_round_trip() {
        let mut chip = ready_chip(DeviceType::Isd1760);
        let mut apc = Apc::default();
        apc.set_volume(5).unwrap();
        apc.set_mix_input(true);
        protocol::write_apc(&mut chip, VolumeControl::Register, apc).unwrap();
        let read_back = protocol::read_apc(&mut chip).unwrap();
        assert_eq!(read_back, apc);
    }

    #[test]
    fn wait_ready_times_out_when_never_ready() {
        let mut chip = ready_chip(DeviceType::Isd1760);
        chip.set_hold_busy(true);
        let before = chip.transactions();
        let err = protocol::wait_ready(&mut chip, 10, 1000).unwrap_err();
        assert_eq!(err, Error::Timeout);
        // Bounded: one status read per poll interval, no more
        assert!(chip.transactions() - before <= 100);
    }

    // ------------------------------------------------------------------
    // Session state-machine tests
    // ------------------------------------------------------------------

    #[test]
    fn init_then_deinit_for_every_part() {
        for device in DeviceType::ALL {
            let mut s = Session::new(device, DummyChip::for_device(device));
            s.init().unwrap();
            assert_eq!(s.state(), State::Idle);
            s.deinit().unwrap();
            assert_eq!(s.state(), State::Deinitialized);
            let chip = s.into_link();
            assert_eq!(chip.play_commands(), 0);
            assert_eq!(chip.record_commands(), 0);
        }
    }

    #[test]
    fn init_rejects_wrong_part() {
        let mut s = Session::new(DeviceType::Isd1730, DummyChip::for_device(DeviceType::Isd1760));
        let err = s.init().unwrap_err();
        assert_eq!(
            err,
            Error::DeviceMismatch {
                expected: 0x10,
                found: 0x14,
            }
        );
        // Retryable from scratch
        assert_eq!(s.state(), State::Uninitialized);
    }

    #[test]
    fn init_fails_on_dead_link() {
        let mut chip = DummyChip::for_device(DeviceType::Isd1760);
        chip.set_fail_link(true);
        let mut s = Session::new(DeviceType::Isd1760, chip);
        assert_eq!(s.init().unwrap_err(), Error::Link);
        assert_eq!(s.state(), State::Uninitialized);
    }

    #[test]
    fn volume_round_trips_and_rejects_out_of_range() {
        let mut s = session(DeviceType::Isd1760);
        for vol in 0..=7 {
            s.set_volume(vol).unwrap();
            assert_eq!(s.volume().unwrap(), vol);
        }
        let before = s.link().transactions();
        assert_eq!(s.set_volume(8), Err(Error::InvalidParameter));
        // Rejected before any transaction; register untouched
        assert_eq!(s.link().transactions(), before);
        assert_eq!(s.volume().unwrap(), 7);
    }

    #[test]
    fn power_cycle_restores_configuration() {
        let mut s = session(DeviceType::Isd1790);
        s.set_volume(3).unwrap();
        s.set_analog_output(AnalogOutput::Aux).unwrap();
        s.set_mix_input(true).unwrap();
        s.set_monitor_input(true).unwrap();
        s.toggle_extern_clock().unwrap();

        s.power_down().unwrap();
        assert_eq!(s.state(), State::PoweredDown);
        // The emulator dropped the volatile registers
        assert_eq!(s.link().apc(), Apc::default());

        s.power_up().unwrap();
        assert_eq!(s.state(), State::Idle);
        assert_eq!(s.volume().unwrap(), 3);
        assert_eq!(s.analog_output().unwrap(), AnalogOutput::Aux);
        assert!(s.mix_input().unwrap());
        assert!(s.monitor_input().unwrap());
        assert!(s.link().extern_clock());
    }

    #[test]
    fn powered_down_chip_serves_nothing_but_power_up() {
        let mut s = session(DeviceType::Isd1760);
        s.power_down().unwrap();
        assert_eq!(s.play(), Err(Error::NotReady));
        assert_eq!(s.record(), Err(Error::NotReady));
        assert_eq!(s.set_volume(1), Err(Error::NotReady));
        assert_eq!(s.status().unwrap_err(), Error::NotReady);
        // clear_interrupt stays legal
        s.clear_interrupt().unwrap();
        s.power_up().unwrap();
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn play_while_recording_is_invalid() {
        let mut s = session(DeviceType::Isd1760);
        s.record().unwrap();
        assert_eq!(s.state(), State::Recording);
        assert_eq!(s.play(), Err(Error::InvalidState));
        assert_eq!(s.state(), State::Recording);
        s.stop().unwrap();
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn erase_span_validates_before_any_transaction() {
        let mut s = session(DeviceType::Isd1730);
        let end = s.variant().end_address;
        let before = s.link().transactions();
        assert_eq!(s.erase_span(0, end + 1), Err(Error::OutOfRange));
        assert_eq!(s.erase_span(5, 5), Err(Error::InvalidParameter));
        assert_eq!(s.link().transactions(), before);
        assert_eq!(s.state(), State::Idle);

        s.erase_span(0, end).unwrap();
        assert_eq!(s.state(), State::Erasing);
        s.wait_idle().unwrap();
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn rejected_command_reports_error_and_idles() {
        let mut s = session(DeviceType::Isd1760);
        s.link_mut().set_reject_next(true);
        assert_eq!(s.play(), Err(Error::CommandError));
        assert_eq!(s.state(), State::Idle);

        // Same outcome when the error bit appears mid-operation
        s.play().unwrap();
        assert_eq!(s.state(), State::Playing);
        s.link_mut().force_command_error();
        assert_eq!(s.status().unwrap_err(), Error::CommandError);
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn never_ready_chip_times_out() {
        let mut s = session(DeviceType::Isd1760);
        s.link_mut().set_hold_busy(true);
        assert_eq!(s.play(), Err(Error::Timeout));
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn playback_completion_via_polling() {
        let mut s = session(DeviceType::Isd1760);
        s.play().unwrap();
        assert_eq!(s.state(), State::Playing);

        let mut polls = 0;
        while s.state() == State::Playing {
            s.status().unwrap();
            polls += 1;
            assert!(polls < 10, "playback never completed");
        }
        assert_eq!(s.state(), State::Idle);
        assert!(s.end_of_message_seen());
        s.clear_interrupt().unwrap();
    }

    #[test]
    fn next_requires_observed_end_of_message() {
        // A long-running playback so completion doesn't race the test
        let chip = DummyChip::new(DummyConfig {
            op_polls: 100,
            ..DummyConfig::for_device(DeviceType::Isd1760)
        });
        let mut s = Session::new(DeviceType::Isd1760, chip);
        s.init().unwrap();
        s.play().unwrap();
        assert_eq!(s.next(), Err(Error::InvalidState));

        // A message boundary arrives while still playing
        s.link_mut().signal_end_of_message();
        s.status().unwrap();
        assert!(s.end_of_message_seen());
        assert_eq!(s.state(), State::Playing);
        s.next().unwrap();
        assert!(!s.end_of_message_seen());
        assert_eq!(s.state(), State::Playing);
        s.stop().unwrap();
    }

    #[test]
    fn recording_until_full_reports_storage_full() {
        let mut s = session(DeviceType::Isd1730);
        s.record().unwrap();
        s.wait_idle().unwrap();
        s.record().unwrap();
        s.wait_idle().unwrap();
        // The store is exhausted now
        assert_eq!(s.record(), Err(Error::StorageFull));
        assert_eq!(s.state(), State::Idle);

        // A global erase reclaims it
        s.global_erase().unwrap();
        s.wait_idle().unwrap();
        s.record().unwrap();
        s.stop().unwrap();
    }

    #[test]
    fn irq_handler_dispatches_to_observer() {
        static EVENTS: AtomicU8 = AtomicU8::new(0);
        fn observe(event: Event) {
            let bit = match event {
                Event::EndOfMessage => 1,
                Event::OperationDone => 2,
                Event::StorageFull => 4,
                Event::CommandError => 8,
            };
            EVENTS.fetch_or(bit, Ordering::SeqCst);
        }

        let mut s = session(DeviceType::Isd1760);
        s.set_observer(observe);
        s.play().unwrap();
        s.link_mut().signal_end_of_message();
        s.irq_handler().unwrap();
        assert_ne!(EVENTS.load(Ordering::SeqCst) & 1, 0);

        // Let the operation run out, then take the completion interrupt
        while s.state() == State::Playing {
            s.status().unwrap();
        }
        s.irq_handler().unwrap();
        assert_ne!(EVENTS.load(Ordering::SeqCst) & 2, 0);
        assert_eq!(s.state(), State::Idle);
    }

    #[test]
    fn contradictory_mode_bits_surface_as_inconsistency() {
        let mut s = session(DeviceType::Isd1760);
        s.play().unwrap();
        // RDY plus both PLAY and REC set
        s.link_mut().force_sr1(Some(0x0D));
        assert_eq!(s.status().unwrap_err(), Error::ProtocolInconsistency);
        s.link_mut().force_sr1(None);
    }

    #[test]
    fn check_memory_reports_health() {
        let mut s = session(DeviceType::Isd1760);
        let check = s.check_memory().unwrap();
        assert!(check.is_healthy());
        assert_eq!(check.play_pointer, 0);

        // Inject a pointer beyond capacity (representable but invalid)
        s.link_mut().set_record_pointer(0x1F5);
        let check = s.check_memory().unwrap();
        assert!(!check.is_healthy());
        assert_eq!(check.record_pointer, 0x1F5);
    }

    #[test]
    fn deinit_persists_configuration() {
        let mut s = session(DeviceType::Isd1760);
        s.set_volume(4).unwrap();
        s.deinit().unwrap();
        let chip = s.into_link();
        assert_eq!(chip.nv_apc().volume(), 4);
        assert!(!chip.powered());
    }

    #[test]
    fn deinit_forces_stop_from_active_state() {
        let mut s = session(DeviceType::Isd1760);
        s.record().unwrap();
        s.deinit().unwrap();
        assert_eq!(s.state(), State::Deinitialized);
        assert_eq!(s.play(), Err(Error::InvalidState));
    }

    #[test]
    fn play_span_cues_the_requested_rows() {
        let mut s = session(DeviceType::Isd17120);
        s.record_span(0x020, 0x040).unwrap();
        s.wait_idle().unwrap();
        s.play_span(0x020, 0x040).unwrap();
        assert_eq!(s.state(), State::Playing);
        assert_eq!(s.read_play_pointer().unwrap(), 0x020);
        s.stop().unwrap();
    }

    #[test]
    fn raw_register_escape_hatch() {
        let mut s = session(DeviceType::Isd1760);
        // EXTCLK through the raw path toggles the clock source
        s.reg_write(opcodes::EXTCLK, &[0x00]).unwrap();
        assert!(s.link().extern_clock());
        let mut buf = [0u8; 2];
        s.reg_read(opcodes::RD_STATUS, &mut buf).unwrap();
    }

    #[test]
    fn soft_and_hardware_reset_return_to_idle() {
        let mut s = session(DeviceType::Isd1760);
        s.play().unwrap();
        s.reset().unwrap();
        assert_eq!(s.state(), State::Idle);

        s.play().unwrap();
        s.hardware_reset().unwrap();
        assert_eq!(s.state(), State::Idle);
        // Configuration came back from NV after the reset
        assert_eq!(s.volume().unwrap(), 0);
    }
}
