//! Consumer control (media key) input reports
//!
//! Two-byte report, packed bit fields:
//!
//! ```text
//! byte 0:  7 6 │ 5 4 │ 3 2 1 0        byte 1:  7 6 │ 5 4 │ 3 2 1 0
//!        volume│chan │ numeric                 --  │ sel │ button
//! ```
//!
//! Bits 6-7 of byte 1 are not in the report map; the host ignores them.

use beanlink_transport::MessageSender;

use crate::report::{HidError, HidReport};

const NUMERIC_MASK: u8 = 0x0F;
const CHANNEL_SHIFT: u8 = 4;
const CHANNEL_MASK: u8 = 0x03 << CHANNEL_SHIFT;
const VOLUME_MASK: u8 = 0xC0;
const BUTTON_MASK: u8 = 0x0F;
const SELECTION_SHIFT: u8 = 4;
const SELECTION_MASK: u8 = 0x03 << SELECTION_SHIFT;

pub const CHANNEL_UP: u8 = 0x01;
pub const CHANNEL_DOWN: u8 = 0x03;
pub const VOLUME_UP: u8 = 0x40;
pub const VOLUME_DOWN: u8 = 0x80;

/// Values of the button field
pub mod button {
    pub const MUTE: u8 = 1;
    pub const POWER: u8 = 2;
    pub const LAST: u8 = 3;
    pub const ASSIGN_SEL: u8 = 4;
    pub const PLAY: u8 = 5;
    pub const PAUSE: u8 = 6;
    pub const RECORD: u8 = 7;
    pub const FAST_FWD: u8 = 8;
    pub const REWIND: u8 = 9;
    pub const SCAN_NEXT: u8 = 10;
    pub const SCAN_PREV: u8 = 11;
    pub const STOP: u8 = 12;
}

/// A consumer control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsumerCommand {
    ChannelUp,
    ChannelDown,
    VolumeUp,
    VolumeDown,
    Mute,
    Power,
    RecallLast,
    AssignSelection,
    Play,
    Pause,
    Record,
    FastForward,
    Rewind,
    ScanNextTrack,
    ScanPreviousTrack,
    Stop,
    /// Numeric keypad digit, 0-9; anything higher sets no bits
    ///
    /// Placed in the numeric field (byte 0 bits 0-3) where the report map
    /// puts the keypad, not in the media button field of byte 1.
    Digit(u8),
}

impl ConsumerCommand {
    fn button(self) -> Option<u8> {
        use ConsumerCommand::*;
        Some(match self {
            Mute => button::MUTE,
            Power => button::POWER,
            RecallLast => button::LAST,
            AssignSelection => button::ASSIGN_SEL,
            Play => button::PLAY,
            Pause => button::PAUSE,
            Record => button::RECORD,
            FastForward => button::FAST_FWD,
            Rewind => button::REWIND,
            ScanNextTrack => button::SCAN_NEXT,
            ScanPreviousTrack => button::SCAN_PREV,
            Stop => button::STOP,
            _ => return None,
        })
    }
}

/// Consumer control report contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport(pub [u8; 2]);

impl ConsumerReport {
    /// Report with only `command` set
    pub fn for_command(command: ConsumerCommand) -> Self {
        let mut report = Self::default();
        report.apply(command);
        report
    }

    /// Set the field `command` drives, replacing its previous value
    pub fn apply(&mut self, command: ConsumerCommand) {
        match command {
            ConsumerCommand::ChannelUp => self.set_channel(CHANNEL_UP),
            ConsumerCommand::ChannelDown => self.set_channel(CHANNEL_DOWN),
            ConsumerCommand::VolumeUp => self.0[0] = (self.0[0] & !VOLUME_MASK) | VOLUME_UP,
            ConsumerCommand::VolumeDown => self.0[0] = (self.0[0] & !VOLUME_MASK) | VOLUME_DOWN,
            ConsumerCommand::Digit(digit) if digit <= 9 => self.set_numeric(digit),
            ConsumerCommand::Digit(_) => {}
            other => {
                if let Some(value) = other.button() {
                    self.set_button(value);
                }
            }
        }
    }

    /// Clear every bit `command` would set
    pub fn clear(&mut self, command: ConsumerCommand) {
        let bits = Self::for_command(command).0;
        self.0[0] &= !bits[0];
        self.0[1] &= !bits[1];
    }

    pub fn numeric(&self) -> u8 {
        self.0[0] & NUMERIC_MASK
    }

    pub fn set_numeric(&mut self, value: u8) {
        self.0[0] = (self.0[0] & !NUMERIC_MASK) | (value & NUMERIC_MASK);
    }

    pub fn channel(&self) -> u8 {
        (self.0[0] & CHANNEL_MASK) >> CHANNEL_SHIFT
    }

    pub fn set_channel(&mut self, value: u8) {
        self.0[0] = (self.0[0] & !CHANNEL_MASK) | ((value << CHANNEL_SHIFT) & CHANNEL_MASK);
    }

    /// Raw volume bits, [`VOLUME_UP`] or [`VOLUME_DOWN`] when set
    pub fn volume(&self) -> u8 {
        self.0[0] & VOLUME_MASK
    }

    pub fn button(&self) -> u8 {
        self.0[1] & BUTTON_MASK
    }

    pub fn set_button(&mut self, value: u8) {
        self.0[1] = (self.0[1] & !BUTTON_MASK) | (value & BUTTON_MASK);
    }

    pub fn selection(&self) -> u8 {
        (self.0[1] & SELECTION_MASK) >> SELECTION_SHIFT
    }

    pub fn set_selection(&mut self, value: u8) {
        self.0[1] = (self.0[1] & !SELECTION_MASK) | ((value << SELECTION_SHIFT) & SELECTION_MASK);
    }
}

/// Consumer control keys sent through a [`MessageSender`]
pub struct ConsumerControl<'a, T: MessageSender> {
    sender: &'a T,
    held: ConsumerReport,
}

impl<'a, T: MessageSender> ConsumerControl<'a, T> {
    pub fn new(sender: &'a T) -> Self {
        Self {
            sender,
            held: ConsumerReport::default(),
        }
    }

    /// Commands currently held
    pub fn held(&self) -> &ConsumerReport {
        &self.held
    }

    /// Send a one-off report with just `command`, ignoring held commands
    ///
    /// The host sees the command as held until another report arrives.
    pub async fn send(&self, command: ConsumerCommand) -> Result<(), HidError<T::Error>> {
        Self::send_report(self.sender, ConsumerReport::for_command(command)).await
    }

    /// Add `command` to the held report and send it
    pub async fn hold(&mut self, command: ConsumerCommand) -> Result<(), HidError<T::Error>> {
        self.held.apply(command);
        Self::send_report(self.sender, self.held).await
    }

    /// Drop `command` from the held report and send what remains
    pub async fn release(&mut self, command: ConsumerCommand) -> Result<(), HidError<T::Error>> {
        self.held.clear(command);
        Self::send_report(self.sender, self.held).await
    }

    async fn send_report(sender: &T, report: ConsumerReport) -> Result<(), HidError<T::Error>> {
        HidReport::consumer_control(report.0).send(sender).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::RecordingSender;
    use embassy_futures::block_on;

    #[test]
    fn test_field_placement() {
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::VolumeUp).0, [0x40, 0]);
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::VolumeDown).0, [0x80, 0]);
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::ChannelUp).0, [0x10, 0]);
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::ChannelDown).0, [0x30, 0]);
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::Play).0, [0, 5]);
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::Stop).0, [0, 12]);
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::Digit(7)).0, [7, 0]);
        assert_eq!(ConsumerReport::for_command(ConsumerCommand::Digit(12)).0, [0, 0]);
    }

    #[test]
    fn test_digit_leaves_button_field_alone() {
        let mut report = ConsumerReport::for_command(ConsumerCommand::Play);
        report.apply(ConsumerCommand::Digit(3));
        assert_eq!(report.0, [3, button::PLAY]);

        report.apply(ConsumerCommand::Digit(0));
        assert_eq!(report.numeric(), 0);
        assert_eq!(report.button(), button::PLAY);
    }

    #[test]
    fn test_fields_are_independent() {
        let mut report = ConsumerReport::default();
        report.apply(ConsumerCommand::Digit(9));
        report.apply(ConsumerCommand::ChannelDown);
        report.apply(ConsumerCommand::VolumeUp);
        report.apply(ConsumerCommand::Mute);
        report.set_selection(2);

        assert_eq!(report.numeric(), 9);
        assert_eq!(report.channel(), CHANNEL_DOWN);
        assert_eq!(report.volume(), VOLUME_UP);
        assert_eq!(report.button(), button::MUTE);
        assert_eq!(report.selection(), 2);

        // Same field, new value
        report.apply(ConsumerCommand::VolumeDown);
        assert_eq!(report.volume(), VOLUME_DOWN);
        assert_eq!(report.numeric(), 9);
    }

    #[test]
    fn test_send_is_one_off() {
        let sender = RecordingSender::default();
        let mut cc = ConsumerControl::new(&sender);

        block_on(cc.hold(ConsumerCommand::VolumeUp)).unwrap();
        block_on(cc.send(ConsumerCommand::Play)).unwrap();

        assert_eq!(sender.reports(), [vec![0x40, 0], vec![0, 5]]);
        assert_eq!(cc.held().0, [0x40, 0]);
    }

    #[test]
    fn test_hold_and_release() {
        let sender = RecordingSender::default();
        let mut cc = ConsumerControl::new(&sender);

        block_on(cc.hold(ConsumerCommand::VolumeDown)).unwrap();
        block_on(cc.hold(ConsumerCommand::FastForward)).unwrap();
        block_on(cc.release(ConsumerCommand::VolumeDown)).unwrap();
        block_on(cc.release(ConsumerCommand::FastForward)).unwrap();

        assert_eq!(
            sender.reports(),
            [vec![0x80, 0], vec![0x80, 8], vec![0, 8], vec![0, 0]]
        );
    }
}
