//! Pin assignments for the pendant board
//!
//! Buttons and joystick switches are active-low with internal pull-ups.

use jogwheel_core::input::{InputId, PinMap};

pub const JOY_LEFT_GPIO: u8 = 6;
pub const JOY_DOWN_GPIO: u8 = 7;
pub const JOY_RIGHT_GPIO: u8 = 8;
pub const JOY_UP_GPIO: u8 = 9;
pub const ENCODER_A_GPIO: u8 = 10;
pub const ENCODER_B_GPIO: u8 = 11;
pub const XY_ZERO_GPIO: u8 = 12;
pub const Z_ZERO_GPIO: u8 = 13;
pub const HOME_GPIO: u8 = 14;
pub const EXTRA_GPIO: u8 = 15;

/// Grbl UART (UART0)
pub const GRBL_TX_GPIO: u8 = 0;
pub const GRBL_RX_GPIO: u8 = 1;
pub const GRBL_BAUDRATE: u32 = 115_200;

/// Speed switches: ADC0 on GPIO26 (X/Y), ADC1 on GPIO27 (Z)
pub const XY_SPEED_GPIO: u8 = 26;
pub const Z_SPEED_GPIO: u8 = 27;

/// GPIO to discrete input
pub const PIN_MAP: PinMap = PinMap::new(&[
    (JOY_LEFT_GPIO, InputId::JoyLeft),
    (JOY_DOWN_GPIO, InputId::JoyDown),
    (JOY_RIGHT_GPIO, InputId::JoyRight),
    (JOY_UP_GPIO, InputId::JoyUp),
    (XY_ZERO_GPIO, InputId::XyZero),
    (Z_ZERO_GPIO, InputId::ZZero),
    (HOME_GPIO, InputId::Home),
    (EXTRA_GPIO, InputId::Extra),
]);
