//! Configuration type definitions
//!
//! Defaults are the reference behaviour of the pendant; `jogwheel.toml`
//! only needs to list what differs.

use crate::input::DebounceTiming;

/// Pendant configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JogConfig {
    /// Debounce window after a button edge (ms)
    pub debounce_ms: u32,
    /// Autorepeat period while a button is held (ms)
    pub repeat_ms: u32,
    /// Input poll period (ms)
    pub poll_interval_ms: u32,
    /// Speed switch sampling period (ms)
    pub speed_sample_ms: u32,
    /// ADC full-scale value (12-bit = 4096)
    pub adc_max: u16,
    /// Encoder counts per mechanical detent
    pub steps_per_detent: u8,
    /// Distance of one jog step (µm); scaled by the speed tier
    pub jog_step_um: u16,
    /// X/Y jog feed rate (mm/min)
    pub xy_feed: u16,
    /// Z jog feed rate (mm/min)
    pub z_feed: u16,
    /// Probing feed rate (mm/min)
    pub probe_feed: u16,
    /// Maximum probing travel before giving up (µm)
    pub probe_travel_um: u32,
    /// Reply timeout for jog and zeroing commands (ms)
    pub response_timeout_ms: u32,
    /// Reply timeout for homing and probing (ms)
    pub motion_timeout_ms: u32,
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            repeat_ms: 150,
            poll_interval_ms: 10,
            speed_sample_ms: 100,
            adc_max: 4096,
            steps_per_detent: 4,
            jog_step_um: 10,
            xy_feed: 1000,
            z_feed: 300,
            probe_feed: 50,
            probe_travel_um: 10_000,
            response_timeout_ms: 3000,
            motion_timeout_ms: 60_000,
        }
    }
}

impl JogConfig {
    /// Debounce timing derived from this configuration
    pub fn debounce_timing(&self) -> DebounceTiming {
        DebounceTiming {
            debounce_ms: self.debounce_ms,
            repeat_ms: self.repeat_ms,
        }
    }

    /// Check that every field is usable
    ///
    /// Zero periods would stall the poll loop or the autorepeat arithmetic.
    pub fn is_valid(&self) -> bool {
        self.debounce_ms > 0
            && self.repeat_ms > 0
            && self.poll_interval_ms > 0
            && self.speed_sample_ms > 0
            && self.adc_max >= 4
            && self.steps_per_detent > 0
            && self.jog_step_um > 0
            && self.xy_feed > 0
            && self.z_feed > 0
            && self.probe_feed > 0
            && self.response_timeout_ms > 0
            && self.motion_timeout_ms > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(JogConfig::default().is_valid());
    }

    #[test]
    fn test_zero_repeat_is_invalid() {
        let config = JogConfig {
            repeat_ms: 0,
            ..JogConfig::default()
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_debounce_timing() {
        let timing = JogConfig::default().debounce_timing();
        assert_eq!(timing.debounce_ms, 50);
        assert_eq!(timing.repeat_ms, 150);
    }
}
