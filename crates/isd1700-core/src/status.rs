//! Status register decoding and interrupt classification
//!
//! A status read returns three bytes: the 16-bit SR0 word and the 8-bit SR1
//! byte. [`StatusSnapshot`] captures one such read as an immutable value;
//! every accessor decodes from the captured raw words, so a snapshot never
//! goes stale silently - it simply describes the moment it was taken.

use bitflags::bitflags;

use crate::error::{Error, Result};

bitflags! {
    /// SR0 - latched condition flags
    ///
    /// The upper bits of SR0 mirror row-address state and are carried in
    /// [`StatusSnapshot::raw_sr0`] but have no flag here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sr0: u16 {
        /// The last command was rejected by the chip
        const CMD_ERR = 1 << 0;
        /// The audio store is full
        const FULL    = 1 << 1;
        /// The chip is powered up
        const PU      = 1 << 2;
        /// Playback reached the end of a message
        const EOM     = 1 << 3;
        /// An interrupt is pending
        const INT     = 1 << 4;
    }
}

bitflags! {
    /// SR1 - readiness and activity flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sr1: u8 {
        /// The chip can accept a new command
        const RDY   = 1 << 0;
        /// An erase operation is in progress
        const ERASE = 1 << 1;
        /// Playback is in progress
        const PLAY  = 1 << 2;
        /// Recording is in progress
        const REC   = 1 << 3;
        /// Sound-effect slot 4 is busy
        const SE4   = 1 << 4;
        /// Sound-effect slot 3 is busy
        const SE3   = 1 << 5;
        /// Sound-effect slot 2 is busy
        const SE2   = 1 << 6;
        /// Sound-effect slot 1 is busy
        const SE1   = 1 << 7;
    }
}

/// What the chip is currently doing, per the mutually exclusive SR1 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No operation in progress
    Idle,
    /// Playback in progress
    Playing,
    /// Recording in progress
    Recording,
    /// Erase in progress
    Erasing,
}

/// Semantic interrupt cause, derived from a status read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Playback reached a message boundary
    EndOfMessage,
    /// The in-progress operation completed
    OperationDone,
    /// Recording hit the end of the audio store
    StorageFull,
    /// The chip rejected a command
    CommandError,
}

/// One point-in-time capture of both status words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Raw SR0 word, including the undecoded row-address bits
    pub raw_sr0: u16,
    /// Raw SR1 byte
    pub raw_sr1: u8,
}

impl StatusSnapshot {
    /// Decode the three-byte status response
    pub fn parse(resp: &[u8]) -> Result<Self> {
        if resp.len() < 3 {
            return Err(Error::ShortResponse);
        }
        Ok(Self {
            raw_sr0: ((resp[0] as u16) << 8) | resp[1] as u16,
            raw_sr1: resp[2],
        })
    }

    /// SR0 condition flags
    pub fn sr0(&self) -> Sr0 {
        Sr0::from_bits_truncate(self.raw_sr0)
    }

    /// SR1 readiness and activity flags
    pub fn sr1(&self) -> Sr1 {
        Sr1::from_bits_truncate(self.raw_sr1)
    }

    /// The chip can accept a new command
    pub fn is_ready(&self) -> bool {
        self.sr1().contains(Sr1::RDY)
    }

    /// Playback reached the end of a message
    pub fn is_end_of_message(&self) -> bool {
        self.sr0().contains(Sr0::EOM)
    }

    /// The last command was rejected
    pub fn is_command_error(&self) -> bool {
        self.sr0().contains(Sr0::CMD_ERR)
    }

    /// The audio store is full
    pub fn is_full(&self) -> bool {
        self.sr0().contains(Sr0::FULL)
    }

    /// An interrupt is pending
    pub fn is_interrupt_pending(&self) -> bool {
        self.sr0().contains(Sr0::INT)
    }

    /// The chip is powered up
    pub fn is_powered_up(&self) -> bool {
        self.sr0().contains(Sr0::PU)
    }

    /// The current operation, decoded from the exclusive SR1 mode bits
    ///
    /// More than one of ERASE/PLAY/REC set at once is reported as
    /// [`Error::ProtocolInconsistency`] rather than guessed. The SE1-SE4
    /// slot-busy bits are independent sub-states and do not participate.
    pub fn active_mode(&self) -> Result<Mode> {
        let sr1 = self.sr1();
        let mut mode = Mode::Idle;
        let mut active = 0u8;
        if sr1.contains(Sr1::ERASE) {
            mode = Mode::Erasing;
            active += 1;
        }
        if sr1.contains(Sr1::PLAY) {
            mode = Mode::Playing;
            active += 1;
        }
        if sr1.contains(Sr1::REC) {
            mode = Mode::Recording;
            active += 1;
        }
        if active > 1 {
            return Err(Error::ProtocolInconsistency);
        }
        Ok(mode)
    }

    /// The busy sound-effect slots, if any
    pub fn busy_slots(&self) -> Sr1 {
        self.sr1() & (Sr1::SE1 | Sr1::SE2 | Sr1::SE3 | Sr1::SE4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(sr0: u16, sr1: u8) -> StatusSnapshot {
        StatusSnapshot {
            raw_sr0: sr0,
            raw_sr1: sr1,
        }
    }

    #[test]
    fn parse_splits_words() {
        let s = StatusSnapshot::parse(&[0x01, 0x18, 0x05]).unwrap();
        assert_eq!(s.raw_sr0, 0x0118);
        assert_eq!(s.raw_sr1, 0x05);
        assert!(s.is_end_of_message());
        assert!(s.is_interrupt_pending());
        assert!(s.is_ready());
    }

    #[test]
    fn parse_rejects_short_response() {
        assert_eq!(
            StatusSnapshot::parse(&[0x00, 0x00]),
            Err(Error::ShortResponse)
        );
    }

    #[test]
    fn condition_flags() {
        let s = snap(0b0_0111, 0x01);
        assert!(s.is_command_error());
        assert!(s.is_full());
        assert!(s.is_powered_up());
        assert!(!s.is_end_of_message());
    }

    #[test]
    fn active_mode_decodes_exclusively() {
        assert_eq!(snap(0, Sr1::RDY.bits()).active_mode(), Ok(Mode::Idle));
        assert_eq!(snap(0, Sr1::PLAY.bits()).active_mode(), Ok(Mode::Playing));
        assert_eq!(snap(0, Sr1::REC.bits()).active_mode(), Ok(Mode::Recording));
        assert_eq!(snap(0, Sr1::ERASE.bits()).active_mode(), Ok(Mode::Erasing));
    }

    #[test]
    fn contradictory_mode_bits_are_an_error() {
        let s = snap(0, (Sr1::PLAY | Sr1::REC).bits());
        assert_eq!(s.active_mode(), Err(Error::ProtocolInconsistency));
    }

    #[test]
    fn slot_busy_bits_do_not_conflict_with_mode() {
        // A busy sound-effect slot alongside PLAY is a valid sub-state
        let s = snap(0, (Sr1::PLAY | Sr1::SE2).bits());
        assert_eq!(s.active_mode(), Ok(Mode::Playing));
        assert_eq!(s.busy_slots(), Sr1::SE2);
    }

    #[test]
    fn row_address_bits_survive_in_raw_word() {
        let s = StatusSnapshot::parse(&[0xA5, 0x00, 0x00]).unwrap();
        assert_eq!(s.raw_sr0, 0xA500);
        assert!(s.sr0().is_empty());
    }
}
