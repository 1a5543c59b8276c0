//! Key codes accepted by [`crate::Keyboard`]
//!
//! Three ranges share one byte:
//!
//! - `0..128`: ASCII, translated through [`ASCII_MAP`]
//! - `128..136`: modifier keys, one bit each in the report's modifier byte
//! - `136..`: raw HID usage codes offset by 136 (arrows, function keys...)

/// Set in an [`ASCII_MAP`] entry when the character needs left shift
pub const SHIFT: u8 = 0x80;

/// Left shift bit in the report's modifier byte
pub const MODIFIER_LEFT_SHIFT: u8 = 0x02;

/// First key code of the raw usage range
pub const RAW_KEY_OFFSET: u8 = 136;

/// First key code of the modifier range
pub const MODIFIER_KEY_BASE: u8 = 128;

pub const KEY_LEFT_CTRL: u8 = 0x80;
pub const KEY_LEFT_SHIFT: u8 = 0x81;
pub const KEY_LEFT_ALT: u8 = 0x82;
pub const KEY_LEFT_GUI: u8 = 0x83;
pub const KEY_RIGHT_CTRL: u8 = 0x84;
pub const KEY_RIGHT_SHIFT: u8 = 0x85;
pub const KEY_RIGHT_ALT: u8 = 0x86;
pub const KEY_RIGHT_GUI: u8 = 0x87;

pub const KEY_RETURN: u8 = 0xB0;
pub const KEY_ESC: u8 = 0xB1;
pub const KEY_BACKSPACE: u8 = 0xB2;
pub const KEY_TAB: u8 = 0xB3;
pub const KEY_CAPS_LOCK: u8 = 0xC1;
pub const KEY_F1: u8 = 0xC2;
pub const KEY_F2: u8 = 0xC3;
pub const KEY_F3: u8 = 0xC4;
pub const KEY_F4: u8 = 0xC5;
pub const KEY_F5: u8 = 0xC6;
pub const KEY_F6: u8 = 0xC7;
pub const KEY_F7: u8 = 0xC8;
pub const KEY_F8: u8 = 0xC9;
pub const KEY_F9: u8 = 0xCA;
pub const KEY_F10: u8 = 0xCB;
pub const KEY_F11: u8 = 0xCC;
pub const KEY_F12: u8 = 0xCD;
pub const KEY_INSERT: u8 = 0xD1;
pub const KEY_HOME: u8 = 0xD2;
pub const KEY_PAGE_UP: u8 = 0xD3;
pub const KEY_DELETE: u8 = 0xD4;
pub const KEY_END: u8 = 0xD5;
pub const KEY_PAGE_DOWN: u8 = 0xD6;
pub const KEY_RIGHT_ARROW: u8 = 0xD7;
pub const KEY_LEFT_ARROW: u8 = 0xD8;
pub const KEY_DOWN_ARROW: u8 = 0xD9;
pub const KEY_UP_ARROW: u8 = 0xDA;

/// US layout: ASCII code to HID usage, [`SHIFT`] set where needed.
/// Zero means the character cannot be typed.
#[rustfmt::skip]
pub static ASCII_MAP: [u8; 128] = [
    // NUL..BEL
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    // BS, TAB, LF (enter), VT, FF, CR, SO, SI
    0x2a, 0x2b, 0x28, 0x00, 0x00, 0x00, 0x00, 0x00,
    // DLE..ETB
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    // CAN..US
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    // ' ' ! " # $ % & '
    0x2c, 0x1e | SHIFT, 0x34 | SHIFT, 0x20 | SHIFT,
    0x21 | SHIFT, 0x22 | SHIFT, 0x24 | SHIFT, 0x34,
    // ( ) * + , - . /
    0x26 | SHIFT, 0x27 | SHIFT, 0x25 | SHIFT, 0x2e | SHIFT,
    0x36, 0x2d, 0x37, 0x38,
    // 0..7
    0x27, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24,
    // 8 9 : ; < = > ?
    0x25, 0x26, 0x33 | SHIFT, 0x33,
    0x36 | SHIFT, 0x2e, 0x37 | SHIFT, 0x38 | SHIFT,
    // @ A..G
    0x1f | SHIFT, 0x04 | SHIFT, 0x05 | SHIFT, 0x06 | SHIFT,
    0x07 | SHIFT, 0x08 | SHIFT, 0x09 | SHIFT, 0x0a | SHIFT,
    // H..O
    0x0b | SHIFT, 0x0c | SHIFT, 0x0d | SHIFT, 0x0e | SHIFT,
    0x0f | SHIFT, 0x10 | SHIFT, 0x11 | SHIFT, 0x12 | SHIFT,
    // P..W
    0x13 | SHIFT, 0x14 | SHIFT, 0x15 | SHIFT, 0x16 | SHIFT,
    0x17 | SHIFT, 0x18 | SHIFT, 0x19 | SHIFT, 0x1a | SHIFT,
    // X Y Z [ \ ] ^ _
    0x1b | SHIFT, 0x1c | SHIFT, 0x1d | SHIFT, 0x2f,
    0x31, 0x30, 0x23 | SHIFT, 0x2d | SHIFT,
    // ` a..g
    0x35, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a,
    // h..o
    0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12,
    // p..w
    0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a,
    // x y z { | } ~ DEL
    0x1b, 0x1c, 0x1d, 0x2f | SHIFT,
    0x31 | SHIFT, 0x30 | SHIFT, 0x35 | SHIFT, 0x00,
];
