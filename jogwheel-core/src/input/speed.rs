//! Speed tier selection from the analog speed switches
//!
//! A raw ADC reading in `[0, full_scale)` is split at the quartiles:
//! readings up to and including `full_scale / 4` are Slow, readings above
//! `3 * full_scale / 4` are Fast, everything in between is Medium.
//!
//! A tier is only reported when it differs from the stored one. There is no
//! dead band, so a reading sitting exactly on a quartile boundary can flip
//! the tier on every sample when the ADC jitters by one LSB.

/// Default ADC full-scale value (12-bit)
pub const DEFAULT_ADC_FULL_SCALE: u16 = 1 << 12;

/// Analog speed channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedChannel {
    /// Joystick (X/Y) speed switch
    Xy,
    /// Rotary encoder (Z) speed switch
    Z,
}

/// Discrete jog speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedTier {
    #[default]
    Slow,
    Medium,
    Fast,
}

impl SpeedTier {
    /// Jog distance multiplier for this tier
    pub fn multiplier(self) -> i16 {
        match self {
            SpeedTier::Slow => 1,
            SpeedTier::Medium => 10,
            SpeedTier::Fast => 25,
        }
    }

    /// Classify a raw reading against the full-scale range
    pub fn classify(raw: u16, full_scale: u16) -> Self {
        let raw = raw as u32;
        let full_scale = full_scale as u32;

        if raw <= full_scale / 4 {
            SpeedTier::Slow
        } else if raw > (full_scale * 3) / 4 {
            SpeedTier::Fast
        } else {
            SpeedTier::Medium
        }
    }
}

/// Edge-triggered tier selector for one analog channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedSelector {
    tier: SpeedTier,
    full_scale: u16,
}

impl SpeedSelector {
    /// Create a selector starting at Slow
    pub const fn new(full_scale: u16) -> Self {
        Self {
            tier: SpeedTier::Slow,
            full_scale,
        }
    }

    /// Currently selected tier
    pub fn tier(&self) -> SpeedTier {
        self.tier
    }

    /// Classify a new reading
    ///
    /// Returns the new tier only if it changed.
    pub fn sample(&mut self, raw: u16) -> Option<SpeedTier> {
        let tier = SpeedTier::classify(raw, self.full_scale);
        if tier == self.tier {
            return None;
        }
        self.tier = tier;
        Some(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAX: u16 = DEFAULT_ADC_FULL_SCALE;

    #[test]
    fn test_quartile_boundaries() {
        assert_eq!(SpeedTier::classify(0, MAX), SpeedTier::Slow);
        assert_eq!(SpeedTier::classify(MAX / 4, MAX), SpeedTier::Slow);
        assert_eq!(SpeedTier::classify(MAX / 4 + 1, MAX), SpeedTier::Medium);
        assert_eq!(SpeedTier::classify(MAX * 3 / 4, MAX), SpeedTier::Medium);
        assert_eq!(SpeedTier::classify(MAX * 3 / 4 + 1, MAX), SpeedTier::Fast);
        assert_eq!(SpeedTier::classify(MAX - 1, MAX), SpeedTier::Fast);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(SpeedTier::Slow.multiplier(), 1);
        assert_eq!(SpeedTier::Medium.multiplier(), 10);
        assert_eq!(SpeedTier::Fast.multiplier(), 25);
    }

    #[test]
    fn test_only_changes_are_reported() {
        let mut selector = SpeedSelector::new(MAX);

        // Starts at Slow, so a Slow reading is not an event
        assert_eq!(selector.sample(100), None);

        assert_eq!(selector.sample(2000), Some(SpeedTier::Medium));
        assert_eq!(selector.sample(2001), None);
        assert_eq!(selector.sample(4000), Some(SpeedTier::Fast));
        assert_eq!(selector.tier(), SpeedTier::Fast);
    }

    #[test]
    fn test_boundary_jitter_flips_every_sample() {
        let mut selector = SpeedSelector::new(MAX);
        for _ in 0..3 {
            assert_eq!(selector.sample(MAX / 4 + 1), Some(SpeedTier::Medium));
            assert_eq!(selector.sample(MAX / 4), Some(SpeedTier::Slow));
        }
    }

    proptest! {
        #[test]
        fn prop_classification_is_monotonic(a in 0u16..MAX, b in 0u16..MAX) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(SpeedTier::classify(lo, MAX) <= SpeedTier::classify(hi, MAX));
        }

        #[test]
        fn prop_repeated_sample_reports_once(raw in 0u16..MAX) {
            let mut selector = SpeedSelector::new(MAX);
            let first = selector.sample(raw);
            prop_assert_eq!(selector.sample(raw), None);
            prop_assert_eq!(first.is_some(), SpeedTier::classify(raw, MAX) != SpeedTier::Slow);
        }
    }
}
