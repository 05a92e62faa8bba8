//! Periodic input poll
//!
//! Advances debounce deadlines and autorepeat, then turns pending events and
//! whole encoder detents into command records. The caller decides how each
//! record is queued.

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::Vec;

use crate::capture::CaptureContext;
use crate::command::{Action, Command};
use crate::config::JogConfig;
use crate::input::{InputId, SpeedChannel, SpeedTier};

/// Maximum number of commands produced by one poll
pub const POLL_BATCH: usize = 16;

/// Commands produced by one poll, oldest first
pub type PollBatch = Vec<Command, POLL_BATCH>;

/// Command issued for one press or repeat of a discrete input
pub fn command_for_input(id: InputId, xy_tier: SpeedTier) -> Command {
    let step = xy_tier.multiplier();
    match id {
        InputId::JoyLeft => Command::new(Action::MoveX, -step),
        InputId::JoyRight => Command::new(Action::MoveX, step),
        InputId::JoyUp => Command::new(Action::MoveY, step),
        InputId::JoyDown => Command::new(Action::MoveY, -step),
        InputId::XyZero => Command::new(Action::ZeroXy, 0),
        InputId::ZZero => Command::new(Action::ZeroZ, 0),
        InputId::Home => Command::new(Action::Home, 0),
        InputId::Extra => Command::new(Action::ProbeZ, 0),
    }
}

/// Poll-loop driver
#[derive(Debug, Clone)]
pub struct InputPoller {
    steps_per_detent: u8,
    speed_sample_ms: u64,
    next_speed_sample_ms: u64,
}

impl InputPoller {
    pub fn new(config: &JogConfig) -> Self {
        Self {
            steps_per_detent: config.steps_per_detent,
            speed_sample_ms: config.speed_sample_ms.max(1) as u64,
            next_speed_sample_ms: 0,
        }
    }

    /// Advance all inputs to `now_ms` and collect the resulting commands
    ///
    /// Events that do not fit in the batch stay pending for the next poll.
    pub fn poll<M: RawMutex>(&mut self, ctx: &CaptureContext<M>, now_ms: u64) -> PollBatch {
        let mut batch = PollBatch::new();

        for id in InputId::ALL {
            ctx.with_state(|state| {
                let level = state.level(id);
                state.debounce.poll(id, level, now_ms);

                let xy_tier = state.tier(SpeedChannel::Xy);
                while !batch.is_full() && state.debounce.take_event(id) {
                    let _ = batch.push(command_for_input(id, xy_tier));
                }
            });
        }

        if !batch.is_full() {
            let steps = self.steps_per_detent;
            let detents = ctx.with_state(|state| {
                let detents = state.encoder.take_detents(steps);
                detents.saturating_mul(state.tier(SpeedChannel::Z).multiplier())
            });
            if detents != 0 {
                let _ = batch.push(Command::new(Action::MoveZ, detents));
            }
        }

        batch
    }

    /// Returns true when the speed switches should be sampled at `now_ms`
    pub fn speed_sample_due(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_speed_sample_ms {
            return false;
        }
        self.next_speed_sample_ms = now_ms + self.speed_sample_ms;
        true
    }
}
