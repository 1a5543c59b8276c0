//! Keyboard input reports
//!
//! The keyboard keeps a persistent report. `press` adds a key and sends it,
//! `release` removes it and sends again; the host treats a key as held until
//! a report without it arrives.

use beanlink_transport::MessageSender;

use crate::keycodes::{ASCII_MAP, MODIFIER_KEY_BASE, MODIFIER_LEFT_SHIFT, RAW_KEY_OFFSET, SHIFT};
use crate::report::{HidError, HidReport};

/// Number of simultaneous non-modifier keys in a boot keyboard report
pub const KEY_SLOTS: usize = 6;

/// Keyboard report contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; KEY_SLOTS],
}

impl KeyReport {
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0] = self.modifiers;
        out[1] = self.reserved;
        out[2..].copy_from_slice(&self.keys);
        out
    }

    fn contains(&self, usage: u8) -> bool {
        self.keys.contains(&usage)
    }

    /// Put `usage` in the first free slot
    fn insert(&mut self, usage: u8) -> bool {
        match self.keys.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => {
                *slot = usage;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, usage: u8) {
        for slot in self.keys.iter_mut().filter(|slot| **slot == usage) {
            *slot = 0;
        }
    }
}

/// What a key code means for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    /// Modifier byte mask
    Modifier(u8),
    /// HID usage, with left shift if the character needs it
    Usage { usage: u8, shifted: bool },
}

fn translate(key: u8) -> Option<Key> {
    if key >= RAW_KEY_OFFSET {
        Some(Key::Usage {
            usage: key - RAW_KEY_OFFSET,
            shifted: false,
        })
    } else if key >= MODIFIER_KEY_BASE {
        Some(Key::Modifier(1 << (key - MODIFIER_KEY_BASE)))
    } else {
        match ASCII_MAP[key as usize] {
            0 => None,
            code => Some(Key::Usage {
                usage: code & !SHIFT,
                shifted: code & SHIFT != 0,
            }),
        }
    }
}

/// Keyboard sending reports through a [`MessageSender`]
pub struct Keyboard<'a, T: MessageSender> {
    sender: &'a T,
    report: KeyReport,
}

impl<'a, T: MessageSender> Keyboard<'a, T> {
    pub fn new(sender: &'a T) -> Self {
        Self {
            sender,
            report: KeyReport::default(),
        }
    }

    /// Current report, as last sent (or about to be)
    pub fn report(&self) -> &KeyReport {
        &self.report
    }

    /// Hold a key down
    ///
    /// Nothing is sent if the key has no scancode or every slot is taken.
    /// Pressing a key that is already held resends the report unchanged.
    pub async fn press(&mut self, key: u8) -> Result<(), HidError<T::Error>> {
        match translate(key).ok_or(HidError::UnmappedKey)? {
            Key::Modifier(mask) => self.report.modifiers |= mask,
            Key::Usage { usage, shifted } => {
                if usage != 0 && !self.report.contains(usage) {
                    let mut next = self.report;
                    if !next.insert(usage) {
                        return Err(HidError::ReportFull);
                    }
                    self.report = next;
                }
                if shifted {
                    self.report.modifiers |= MODIFIER_LEFT_SHIFT;
                }
            }
        }
        self.send().await
    }

    /// Let a key go
    pub async fn release(&mut self, key: u8) -> Result<(), HidError<T::Error>> {
        match translate(key).ok_or(HidError::UnmappedKey)? {
            Key::Modifier(mask) => self.report.modifiers &= !mask,
            Key::Usage { usage, shifted } => {
                if shifted {
                    self.report.modifiers &= !MODIFIER_LEFT_SHIFT;
                }
                if usage != 0 {
                    self.report.remove(usage);
                }
            }
        }
        self.send().await
    }

    /// Release every key and modifier
    pub async fn release_all(&mut self) -> Result<(), HidError<T::Error>> {
        self.report = KeyReport::default();
        self.send().await
    }

    /// Type one key: press then release
    ///
    /// The release is sent even when the press failed, so a key is never
    /// left stuck down. Only the press result is returned.
    pub async fn write(&mut self, key: u8) -> Result<(), HidError<T::Error>> {
        let pressed = self.press(key).await;
        let _ = self.release(key).await;
        pressed
    }

    /// Type a string, stopping at the first character that fails
    ///
    /// Returns the number of characters typed.
    pub async fn write_str(&mut self, text: &str) -> Result<usize, HidError<T::Error>> {
        let mut typed = 0;
        for ch in text.chars() {
            // Only ASCII has entries in the map; higher key codes mean modifiers
            if !ch.is_ascii() {
                return Err(HidError::UnmappedKey);
            }
            self.write(ch as u8).await?;
            typed += 1;
        }
        Ok(typed)
    }

    async fn send(&self) -> Result<(), HidError<T::Error>> {
        HidReport::keyboard(self.report.to_bytes())
            .send(self.sender)
            .await
    }
}
