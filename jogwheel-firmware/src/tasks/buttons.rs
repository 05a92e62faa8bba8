//! Discrete input edge task
//!
//! One instance per button or joystick switch. Each edge records the new
//! level in the capture context; debounce expiry and autorepeat are left to
//! the poll task.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{with_timeout, Duration, Instant};

use jogwheel_core::input::InputId;

use crate::board;
use crate::channels::SharedCapture;

/// Re-read the level this often even without an edge, in case an edge was
/// missed between reading the pin and re-arming the interrupt
const LEVEL_REFRESH_MS: u64 = 100;

/// Button edge task
#[embassy_executor::task(pool_size = 8)]
pub async fn button_task(id: InputId, mut input: Input<'static>, capture: &'static SharedCapture) {
    match board::PIN_MAP.gpio_of(id) {
        Some(gpio) => info!("Button task started: {} (GPIO{})", id.name(), gpio),
        None => info!("Button task started: {}", id.name()),
    }

    // Active-low
    let mut asserted = false;

    loop {
        let level = input.is_low();
        if level != asserted {
            asserted = level;
            let now_ms = Instant::now().as_millis();
            match capture.on_level(id, asserted, now_ms) {
                Some(deadline) => trace!("{}: debouncing until {} ms", id.name(), deadline),
                None => trace!("{}: level {}", id.name(), asserted),
            }
        }

        // Timeout just forces a level refresh
        let _ = with_timeout(
            Duration::from_millis(LEVEL_REFRESH_MS),
            input.wait_for_any_edge(),
        )
        .await;
    }
}
