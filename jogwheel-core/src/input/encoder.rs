//! Quadrature decoding for the rotary encoder
//!
//! The two encoder lines form a 2-bit code `(A << 1) | B`. Every transition
//! of either line looks up a signed delta by (previous code, current code):
//!
//! - single Gray-code steps count ±1
//! - a jump across two steps (both lines changed at once) counts ±2
//! - no change counts 0
//!
//! Forward rotation runs `00 → 10 → 11 → 01 → 00`. A two-step jump is
//! assumed to continue forward from `00`/`01` and backward from `11`/`10`,
//! which keeps the table antisymmetric: undoing any transition cancels it.
//!
//! The encoder lines are not debounced.

/// Position delta indexed by `[previous][current]`
pub const TRANSITION_TABLE: [[i8; 4]; 4] = [
    //  00  01  10  11
    [0, -1, 1, 2],  // 00
    [1, 0, 2, -1],  // 01
    [-1, -2, 0, 1], // 10
    [-2, 1, -1, 0], // 11
];

/// Default number of counts per mechanical detent
pub const DEFAULT_STEPS_PER_DETENT: u8 = 4;

/// Combine line levels into a quadrature code
pub const fn code(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | (b as u8)
}

/// Table-driven quadrature decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureDecoder {
    last_code: u8,
    position: i32,
    /// Position already turned into detents
    consumed: i32,
}

impl QuadratureDecoder {
    /// Create a decoder assuming both lines start low
    pub const fn new() -> Self {
        Self {
            last_code: 0,
            position: 0,
            consumed: 0,
        }
    }

    /// Re-synchronise the stored code with the actual line levels
    ///
    /// Does not move the position.
    pub fn sync(&mut self, a: bool, b: bool) {
        self.last_code = code(a, b);
    }

    /// Handle a transition of either line
    ///
    /// Returns the delta applied to the position.
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        let current = code(a, b);
        let delta = TRANSITION_TABLE[self.last_code as usize][current as usize];
        self.position = self.position.wrapping_add(delta as i32);
        self.last_code = current;
        delta
    }

    /// Accumulated position in counts
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Take the whole detents accumulated since the last call
    ///
    /// Partial detents stay behind for the next call.
    pub fn take_detents(&mut self, steps_per_detent: u8) -> i16 {
        let steps = steps_per_detent.max(1) as i32;
        let pending = self.position.wrapping_sub(self.consumed);
        let detents = (pending / steps).clamp(i16::MIN as i32, i16::MAX as i32);
        self.consumed = self.consumed.wrapping_add(detents * steps);
        detents as i16
    }
}
