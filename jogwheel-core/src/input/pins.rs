//! GPIO to input lookup
//!
//! Built once from the board's pin assignments and read-only afterwards.

use super::InputId;

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Table mapping a GPIO number to the input wired to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    table: [Option<InputId>; GPIO_COUNT],
}

impl PinMap {
    /// Build a table from `(gpio, input)` pairs
    ///
    /// Out-of-range GPIOs are ignored; a later pair for the same GPIO wins.
    pub const fn new(assignments: &[(u8, InputId)]) -> Self {
        let mut table = [None; GPIO_COUNT];
        let mut i = 0;
        while i < assignments.len() {
            let (gpio, id) = assignments[i];
            if (gpio as usize) < GPIO_COUNT {
                table[gpio as usize] = Some(id);
            }
            i += 1;
        }
        Self { table }
    }

    /// Input wired to `gpio`, if any
    pub const fn lookup(&self, gpio: u8) -> Option<InputId> {
        if (gpio as usize) < GPIO_COUNT {
            self.table[gpio as usize]
        } else {
            None
        }
    }

    /// GPIO an input is wired to, if any
    pub fn gpio_of(&self, id: InputId) -> Option<u8> {
        self.table
            .iter()
            .position(|entry| *entry == Some(id))
            .map(|gpio| gpio as u8)
    }
}
