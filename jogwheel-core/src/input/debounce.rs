//! Debounce and autorepeat for discrete inputs
//!
//! Each input runs a small state machine:
//!
//! ```text
//!            falling edge              window elapsed, still asserted
//!   Idle ───────────────▶ Debouncing ──────────────────────────────▶ Repeating
//!    ▲                        │                                          │
//!    │   window elapsed,      │                                          │
//!    ├────── released ────────┘                                          │
//!    └──────────────────────────────── released ─────────────────────────┘
//! ```
//!
//! Entering `Repeating` emits one event. While `Repeating`, every elapsed
//! repeat period emits another. Events accumulate in a pending counter that
//! the consumer drains one at a time, so repeats that pile up between two
//! polls are not lost.
//!
//! Edges seen during the debounce window do not re-arm it: the level is
//! evaluated exactly once, at the deadline, which bounds press latency.
//! A fresh edge while `Repeating` (released and pressed again between two
//! polls) starts a new window and ends the old autorepeat.

use super::{InputId, INPUT_COUNT};

/// Debounce state of a single input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    /// Released, waiting for a falling edge
    Idle,
    /// Edge seen, waiting for the debounce window to elapse
    Debouncing,
    /// Press confirmed, emitting autorepeat events while held
    Repeating,
}

/// Debounce and autorepeat timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceTiming {
    /// Delay after an edge before the level is trusted (ms)
    pub debounce_ms: u32,
    /// Autorepeat period while held (ms)
    pub repeat_ms: u32,
}

impl Default for DebounceTiming {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            repeat_ms: 150,
        }
    }
}

impl DebounceTiming {
    fn repeat_period(&self) -> u64 {
        // A zero period would never let the repeat deadline advance
        self.repeat_ms.max(1) as u64
    }
}

/// Per-input debounce state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiscreteInput {
    id: InputId,
    state: DebounceState,
    debounce_deadline_ms: u64,
    repeat_deadline_ms: u64,
    pending: u16,
}

impl DiscreteInput {
    /// Create an idle input
    pub const fn new(id: InputId) -> Self {
        Self {
            id,
            state: DebounceState::Idle,
            debounce_deadline_ms: 0,
            repeat_deadline_ms: 0,
            pending: 0,
        }
    }

    /// Input identity
    pub fn id(&self) -> InputId {
        self.id
    }

    /// Current debounce state
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Number of events not yet drained
    pub fn pending(&self) -> u16 {
        self.pending
    }

    /// Handle an asserting (falling) edge
    ///
    /// Returns the debounce deadline when a new window was armed, or `None`
    /// if the edge was ignored because a window is already open.
    pub fn on_edge(&mut self, now_ms: u64, timing: &DebounceTiming) -> Option<u64> {
        if self.state == DebounceState::Debouncing {
            return None;
        }
        self.state = DebounceState::Debouncing;
        self.debounce_deadline_ms = now_ms + timing.debounce_ms as u64;
        Some(self.debounce_deadline_ms)
    }

    /// Evaluate the level at the end of the debounce window
    ///
    /// Has no effect unless the input is `Debouncing`.
    pub fn on_debounce_expire(&mut self, asserted: bool, timing: &DebounceTiming) {
        if self.state != DebounceState::Debouncing {
            return;
        }

        if asserted {
            self.state = DebounceState::Repeating;
            self.pending = self.pending.saturating_add(1);
            // Anchored to the deadline so a late poll does not stretch the period
            self.repeat_deadline_ms = self.debounce_deadline_ms + timing.repeat_period();
        } else {
            self.state = DebounceState::Idle;
        }
    }

    /// Advance time-dependent state with the current level
    pub fn poll(&mut self, asserted: bool, now_ms: u64, timing: &DebounceTiming) {
        match self.state {
            DebounceState::Idle => {}
            DebounceState::Debouncing => {
                if now_ms >= self.debounce_deadline_ms {
                    self.on_debounce_expire(asserted, timing);
                }
            }
            DebounceState::Repeating => {
                if !asserted {
                    self.state = DebounceState::Idle;
                    return;
                }
                while now_ms >= self.repeat_deadline_ms {
                    self.pending = self.pending.saturating_add(1);
                    self.repeat_deadline_ms += timing.repeat_period();
                }
            }
        }
    }

    /// Drain one pending event
    pub fn take_event(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }
}

/// Debounce state for every discrete input
#[derive(Debug, Clone)]
pub struct DebounceEngine {
    inputs: [DiscreteInput; INPUT_COUNT],
    timing: DebounceTiming,
}

impl DebounceEngine {
    /// Create an engine with all inputs idle
    pub fn new(timing: DebounceTiming) -> Self {
        Self {
            inputs: InputId::ALL.map(DiscreteInput::new),
            timing,
        }
    }

    /// Timing in use
    pub fn timing(&self) -> &DebounceTiming {
        &self.timing
    }

    /// Read-only view of one input
    pub fn input(&self, id: InputId) -> &DiscreteInput {
        &self.inputs[id.index()]
    }

    /// Current state of one input
    pub fn state(&self, id: InputId) -> DebounceState {
        self.inputs[id.index()].state
    }

    /// See [`DiscreteInput::on_edge`]
    pub fn on_edge(&mut self, id: InputId, now_ms: u64) -> Option<u64> {
        self.inputs[id.index()].on_edge(now_ms, &self.timing)
    }

    /// See [`DiscreteInput::on_debounce_expire`]
    pub fn on_debounce_expire(&mut self, id: InputId, asserted: bool) {
        self.inputs[id.index()].on_debounce_expire(asserted, &self.timing);
    }

    /// See [`DiscreteInput::poll`]
    pub fn poll(&mut self, id: InputId, asserted: bool, now_ms: u64) {
        self.inputs[id.index()].poll(asserted, now_ms, &self.timing);
    }

    /// See [`DiscreteInput::take_event`]
    pub fn take_event(&mut self, id: InputId) -> bool {
        self.inputs[id.index()].take_event()
    }
}
