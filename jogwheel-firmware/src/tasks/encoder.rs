//! Rotary encoder task
//!
//! Feeds every transition of either quadrature line to the decoder. The
//! lines are not debounced.

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;

use crate::channels::SharedCapture;

/// Encoder rotation task
#[embassy_executor::task]
pub async fn encoder_task(
    mut a: Input<'static>,
    mut b: Input<'static>,
    capture: &'static SharedCapture,
) {
    info!("Encoder task started");

    capture.sync_encoder(a.is_high(), b.is_high());

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;

        let delta = capture.on_encoder(a.is_high(), b.is_high());
        if delta != 0 {
            trace!("Encoder delta {}", delta);
        }
    }
}
