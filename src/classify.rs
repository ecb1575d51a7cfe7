//! # Classification Module
//!
//! Turns a raw [`Sample`] into a [`Derived`] quantity and, optionally, into
//! a discrete bucket.
//!
//! ## Linear mapping
//!
//! ```text
//! derived = out_min + (clamp(sample, in_min, in_max) - in_min)
//!                     * (out_max - out_min) / (in_max - in_min)
//! ```
//!
//! Division truncates. There is no rounding anywhere in the pipeline, so a
//! goniometer calibrated 735..2535 mV to 0..150 degrees reports 75 degrees
//! at 1635 mV and 0 degrees for anything at or below 735 mV.
//!
//! ## Buckets
//!
//! A bucket table is an ordered list of upper bounds. Bucket `i` covers
//! `[bounds[i-1], bounds[i])`; anything at or above the last bound lands in
//! bucket `bounds.len()`.
use core::ops::RangeInclusive;

use crate::error::ConfigurationError;
use crate::state::{Derived, Sample};

/// Calibrated linear map from a raw input range onto an output range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    in_min: Sample,
    in_max: Sample,
    out_min: Derived,
    out_max: Derived,
}

impl Calibration {
    /// Fails with [`ConfigurationError::EmptyRange`] when `input` holds
    /// fewer than two values. `output` may run downwards.
    pub const fn new(
        input: RangeInclusive<Sample>,
        output: RangeInclusive<Derived>,
    ) -> Result<Self, ConfigurationError> {
        let (in_min, in_max) = (*input.start(), *input.end());
        if in_min >= in_max {
            return Err(ConfigurationError::EmptyRange);
        }
        Ok(Self {
            in_min,
            in_max,
            out_min: *output.start(),
            out_max: *output.end(),
        })
    }

    pub fn input(&self) -> RangeInclusive<Sample> {
        self.in_min..=self.in_max
    }

    pub fn derive(&self, sample: Sample) -> Derived {
        let sample = sample.clamp(self.in_min, self.in_max);
        let offset = i64::from(sample - self.in_min);
        let span_out = i64::from(self.out_max) - i64::from(self.out_min);
        let span_in = i64::from(self.in_max - self.in_min);
        (i64::from(self.out_min) + offset * span_out / span_in) as Derived
    }
}

/// How a deployment gets from sample to quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Clamped linear calibration.
    Linear(Calibration),
    /// `sample * num / den`, for accumulators such as pulse counters.
    Scale { num: i32, den: i32 },
    /// Sample passed through unchanged.
    Identity,
}

impl Derivation {
    pub const fn scale(num: i32, den: i32) -> Result<Self, ConfigurationError> {
        if den == 0 {
            return Err(ConfigurationError::ZeroDivisor);
        }
        Ok(Self::Scale { num, den })
    }

    pub fn derive(&self, sample: Sample) -> Derived {
        match self {
            Self::Linear(calibration) => calibration.derive(sample),
            Self::Scale { num, den } => {
                let scaled = i64::from(sample) * i64::from(*num) / i64::from(*den);
                scaled.clamp(i64::from(Derived::MIN), i64::from(Derived::MAX)) as Derived
            }
            Self::Identity => Derived::try_from(sample).unwrap_or(Derived::MAX),
        }
    }
}

/// Ordered upper bounds selecting a bucket id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buckets<'a> {
    bounds: &'a [Derived],
}

impl<'a> Buckets<'a> {
    /// Bounds must be strictly increasing.
    pub const fn new(bounds: &'a [Derived]) -> Result<Self, ConfigurationError> {
        let mut i = 1;
        while i < bounds.len() {
            if bounds[i - 1] >= bounds[i] {
                return Err(ConfigurationError::UnorderedBounds);
            }
            i += 1;
        }
        Ok(Self { bounds })
    }

    /// Number of distinct buckets, one more than the number of bounds.
    pub fn len(&self) -> usize {
        self.bounds.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn classify(&self, value: Derived) -> usize {
        self.bounds
            .iter()
            .position(|&bound| value < bound)
            .unwrap_or(self.bounds.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goniometer() -> Calibration {
        Calibration::new(735..=2535, 0..=150).unwrap()
    }

    #[test]
    fn goniometer_sequence_clamps_both_ends() {
        let calibration = goniometer();
        let derived: std::vec::Vec<Derived> = [700, 735, 1635, 2535, 3000]
            .iter()
            .map(|&raw| calibration.derive(raw))
            .collect();
        assert_eq!(derived, [0, 0, 75, 150, 150]);
    }

    #[test]
    fn output_stays_inside_calibrated_range() {
        let calibration = goniometer();
        for raw in (0..4000).step_by(7).chain([0, Sample::MAX]) {
            let value = calibration.derive(raw);
            assert!((0..=150).contains(&value), "{} -> {}", raw, value);
        }
    }

    #[test]
    fn mapping_is_monotonic_inside_range() {
        let calibration = goniometer();
        let mut previous = calibration.derive(735);
        for raw in 736..=2535 {
            let value = calibration.derive(raw);
            assert!(previous <= value);
            previous = value;
        }
    }

    #[test]
    fn mapping_truncates() {
        let calibration = goniometer();
        // 12 * 150 / 1800 = 1.0, 11 * 150 / 1800 = 0.91
        assert_eq!(calibration.derive(735 + 11), 0);
        assert_eq!(calibration.derive(735 + 12), 1);
    }

    #[test]
    fn falling_calibration_maps_downwards() {
        // pH electrode: more millivolts, lower pH (x100).
        let calibration = Calibration::new(0..=3000, 1400..=0).unwrap();
        assert_eq!(calibration.derive(0), 1400);
        assert_eq!(calibration.derive(1500), 700);
        assert_eq!(calibration.derive(9000), 0);
    }

    #[test]
    fn empty_range_is_rejected() {
        assert_eq!(
            Calibration::new(10..=10, 0..=1),
            Err(ConfigurationError::EmptyRange)
        );
    }

    #[test]
    fn scale_truncates_pulses_to_centimetres() {
        let odometer = Derivation::scale(471, 100).unwrap();
        assert_eq!(odometer.derive(0), 0);
        assert_eq!(odometer.derive(1), 4);
        assert_eq!(odometer.derive(20), 94);
        assert_eq!(Derivation::scale(1, 0), Err(ConfigurationError::ZeroDivisor));
    }

    #[test]
    fn identity_passes_through() {
        assert_eq!(Derivation::Identity.derive(1), 1);
    }

    #[test]
    fn bucket_bounds_are_lower_inclusive() {
        let buckets = Buckets::new(&[10, 20, 30]).unwrap();
        assert_eq!(buckets.classify(9), 0);
        assert_eq!(buckets.classify(10), 1);
        assert_eq!(buckets.classify(19), 1);
        assert_eq!(buckets.classify(20), 2);
        assert_eq!(buckets.classify(30), 3);
        assert_eq!(buckets.len(), 4);
    }

    #[test]
    fn distance_sequence_buckets() {
        let buckets = Buckets::new(&[10, 20, 30]).unwrap();
        let picked: std::vec::Vec<usize> =
            [5, 15, 25, 35].iter().map(|&d| buckets.classify(d)).collect();
        assert_eq!(picked, [0, 1, 2, 3]);
    }

    #[test]
    fn unordered_bounds_are_rejected() {
        assert_eq!(
            Buckets::new(&[10, 10, 30]),
            Err(ConfigurationError::UnorderedBounds)
        );
        assert_eq!(Buckets::new(&[30, 20]), Err(ConfigurationError::UnorderedBounds));
    }
}
