//! Discrete, quadrature and analog input handling
//!
//! Everything here is plain state driven by explicit timestamps and levels,
//! so the same code runs under the firmware's tasks and in host tests.

pub mod debounce;
pub mod encoder;
pub mod pins;
pub mod speed;

pub use debounce::{DebounceEngine, DebounceState, DebounceTiming, DiscreteInput};
pub use encoder::{QuadratureDecoder, TRANSITION_TABLE};
pub use pins::{PinMap, GPIO_COUNT};
pub use speed::{SpeedChannel, SpeedSelector, SpeedTier};

/// Number of discrete (push-button style) inputs
pub const INPUT_COUNT: usize = 8;

/// Discrete inputs on the pendant
///
/// The four joystick directions come first, in L-U-R-D order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputId {
    JoyLeft,
    JoyUp,
    JoyRight,
    JoyDown,
    XyZero,
    ZZero,
    Home,
    Extra,
}

impl InputId {
    /// All inputs in index order
    pub const ALL: [InputId; INPUT_COUNT] = [
        InputId::JoyLeft,
        InputId::JoyUp,
        InputId::JoyRight,
        InputId::JoyDown,
        InputId::XyZero,
        InputId::ZZero,
        InputId::Home,
        InputId::Extra,
    ];

    /// Dense array index of this input
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            InputId::JoyLeft => "Joy-Left",
            InputId::JoyUp => "Joy-Up",
            InputId::JoyRight => "Joy-Right",
            InputId::JoyDown => "Joy-Down",
            InputId::XyZero => "Button-XY-Zero",
            InputId::ZZero => "Button-Z-Zero",
            InputId::Home => "Button-Home",
            InputId::Extra => "Button-Extra",
        }
    }

    /// Returns true for the four joystick directions
    pub fn is_joystick(self) -> bool {
        matches!(
            self,
            InputId::JoyLeft | InputId::JoyUp | InputId::JoyRight | InputId::JoyDown
        )
    }
}
