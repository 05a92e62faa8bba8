//! Shared input-capture state
//!
//! Edge handlers (button and encoder tasks) and the poll loop all touch the
//! same debounce, encoder and speed state. Everything lives behind one
//! blocking mutex so each update is a short critical section.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::JogConfig;
use crate::input::{
    DebounceEngine, InputId, QuadratureDecoder, SpeedChannel, SpeedSelector, SpeedTier,
    INPUT_COUNT,
};

/// Capture state guarded by [`CaptureContext`]
pub struct CaptureState {
    pub debounce: DebounceEngine,
    /// Last level reported per input (true = asserted)
    levels: [bool; INPUT_COUNT],
    pub encoder: QuadratureDecoder,
    pub xy_speed: SpeedSelector,
    pub z_speed: SpeedSelector,
}

impl CaptureState {
    fn new(config: &JogConfig) -> Self {
        Self {
            debounce: DebounceEngine::new(config.debounce_timing()),
            levels: [false; INPUT_COUNT],
            encoder: QuadratureDecoder::new(),
            xy_speed: SpeedSelector::new(config.adc_max),
            z_speed: SpeedSelector::new(config.adc_max),
        }
    }

    /// Last reported level of an input
    pub fn level(&self, id: InputId) -> bool {
        self.levels[id.index()]
    }

    /// Selected tier of a speed channel
    pub fn tier(&self, channel: SpeedChannel) -> SpeedTier {
        match channel {
            SpeedChannel::Xy => self.xy_speed.tier(),
            SpeedChannel::Z => self.z_speed.tier(),
        }
    }

    fn selector(&mut self, channel: SpeedChannel) -> &mut SpeedSelector {
        match channel {
            SpeedChannel::Xy => &mut self.xy_speed,
            SpeedChannel::Z => &mut self.z_speed,
        }
    }
}

/// Input-capture context shared between tasks
pub struct CaptureContext<M: RawMutex> {
    state: Mutex<M, RefCell<CaptureState>>,
}

impl<M: RawMutex> CaptureContext<M> {
    pub fn new(config: &JogConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(CaptureState::new(config))),
        }
    }

    /// Record a level change on a discrete input
    ///
    /// An asserting level starts debouncing unless a window is already
    /// open; the returned deadline tells the caller when the window closes.
    /// The level is kept either way so the poll loop can evaluate it later.
    pub fn on_level(&self, id: InputId, asserted: bool, now_ms: u64) -> Option<u64> {
        self.with_state(|state| {
            state.levels[id.index()] = asserted;
            if asserted {
                state.debounce.on_edge(id, now_ms)
            } else {
                None
            }
        })
    }

    /// Feed the current encoder line levels
    pub fn on_encoder(&self, a: bool, b: bool) -> i8 {
        self.with_state(|state| state.encoder.update(a, b))
    }

    /// Align the encoder decoder with the lines at startup
    pub fn sync_encoder(&self, a: bool, b: bool) {
        self.with_state(|state| state.encoder.sync(a, b));
    }

    /// Classify a raw ADC reading, returning the tier if it changed
    pub fn sample_speed(&self, channel: SpeedChannel, raw: u16) -> Option<SpeedTier> {
        self.with_state(|state| state.selector(channel).sample(raw))
    }

    /// Run `f` with exclusive access to the state
    pub fn with_state<R>(&self, f: impl FnOnce(&mut CaptureState) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
