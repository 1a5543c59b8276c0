//! Mouse input reports
//!
//! Report data: `[buttons, x, y, wheel]`, movement relative and signed.

use beanlink_transport::MessageSender;

use crate::report::{HidError, HidReport};

pub const MOUSE_LEFT: u8 = 0x01;
pub const MOUSE_RIGHT: u8 = 0x02;
pub const MOUSE_MIDDLE: u8 = 0x04;
pub const MOUSE_ALL: u8 = MOUSE_LEFT | MOUSE_RIGHT | MOUSE_MIDDLE;

/// Mouse sending reports through a [`MessageSender`]
///
/// Button state persists between reports; every movement carries it.
pub struct Mouse<'a, T: MessageSender> {
    sender: &'a T,
    buttons: u8,
}

impl<'a, T: MessageSender> Mouse<'a, T> {
    pub fn new(sender: &'a T) -> Self {
        Self { sender, buttons: 0 }
    }

    /// Move by a relative amount with the current buttons held
    pub async fn move_by(&mut self, x: i8, y: i8, wheel: i8) -> Result<(), HidError<T::Error>> {
        HidReport::mouse([self.buttons, x as u8, y as u8, wheel as u8])
            .send(self.sender)
            .await
    }

    /// Press and release `buttons` in two reports
    ///
    /// Buttons end up released even if the first report fails.
    pub async fn click(&mut self, buttons: u8) -> Result<(), HidError<T::Error>> {
        self.buttons = buttons;
        let down = self.move_by(0, 0, 0).await;
        self.buttons = 0;
        down?;
        self.move_by(0, 0, 0).await
    }

    /// Replace the held buttons, sending a report only on change
    pub async fn set_buttons(&mut self, buttons: u8) -> Result<(), HidError<T::Error>> {
        if buttons == self.buttons {
            return Ok(());
        }
        self.buttons = buttons;
        self.move_by(0, 0, 0).await
    }

    pub async fn press(&mut self, buttons: u8) -> Result<(), HidError<T::Error>> {
        self.set_buttons(self.buttons | buttons).await
    }

    pub async fn release(&mut self, buttons: u8) -> Result<(), HidError<T::Error>> {
        self.set_buttons(self.buttons & !buttons).await
    }

    /// True if any of `buttons` is held
    pub fn is_pressed(&self, buttons: u8) -> bool {
        self.buttons & buttons != 0
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }
}
