//! Input poll task
//!
//! Runs at the configured poll interval: samples the speed switches when
//! due, advances debounce and autorepeat, and queues the resulting commands.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Instant, Ticker};

use jogwheel_core::config::JogConfig;
use jogwheel_core::input::SpeedChannel;
use jogwheel_core::{Command, InputPoller};

use crate::channels::{SharedCapture, COMMAND_QUEUE};

/// ADC and the two speed switch channels
pub struct SpeedInputs {
    pub adc: Adc<'static, Async>,
    pub xy: Channel<'static>,
    pub z: Channel<'static>,
}

/// Input poll task
#[embassy_executor::task]
pub async fn poll_task(capture: &'static SharedCapture, speed: SpeedInputs, config: JogConfig) {
    info!(
        "Poll task started (every {} ms, speed every {} ms)",
        config.poll_interval_ms, config.speed_sample_ms
    );

    let SpeedInputs {
        mut adc,
        mut xy,
        mut z,
    } = speed;
    let mut poller = InputPoller::new(&config);
    let mut ticker = Ticker::every(Duration::from_millis(config.poll_interval_ms as u64));

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        if poller.speed_sample_due(now_ms) {
            sample_speed(&mut adc, &mut xy, SpeedChannel::Xy, capture).await;
            sample_speed(&mut adc, &mut z, SpeedChannel::Z, capture).await;
        }

        for command in poller.poll(capture, now_ms) {
            dispatch(command).await;
        }
    }
}

async fn sample_speed(
    adc: &mut Adc<'static, Async>,
    channel: &mut Channel<'static>,
    speed: SpeedChannel,
    capture: &SharedCapture,
) {
    match adc.read(channel).await {
        Ok(raw) => {
            if let Some(tier) = capture.sample_speed(speed, raw) {
                info!("{:?} speed -> {:?} (x{})", speed, tier, tier.multiplier());
            }
        }
        Err(e) => {
            warn!("ADC read error on {:?}: {:?}", speed, e);
        }
    }
}

/// Queue a command
///
/// Jogs can autorepeat, so they are dropped rather than stalling the poll
/// loop behind a busy controller. One-shot commands wait for space.
async fn dispatch(command: Command) {
    let action = command.action;
    debug!("Queue {} {}", action.name(), command.arg);

    if action.is_jog() {
        if COMMAND_QUEUE.try_enqueue(command).is_err() {
            warn!("Command queue full, dropping {} {}", action.name(), command.arg);
        }
    } else {
        COMMAND_QUEUE.enqueue_blocking(command).await;
    }
}
