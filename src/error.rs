//! Error kinds surfaced by the core.
//!
//! Only two conditions are ever checked. Bad configuration aborts the one
//! operation that needed it; a bad command byte is reported and dropped.
//! Out-of-range sensor readings are clamped and never become errors.
use core::fmt;

use embassy_time::{Duration, Timer};
use rtt_target::rprintln;

use crate::output::Switch;

/// Invalid deployment or call-site configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Calibration input range is empty (`in_min >= in_max`).
    EmptyRange,
    /// Scale derivation with a zero denominator.
    ZeroDivisor,
    /// Bucket bounds are not strictly increasing.
    UnorderedBounds,
    /// More BCD digits requested than the display can show.
    DigitCount { requested: usize, capacity: usize },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange => write!(f, "empty calibration range"),
            Self::ZeroDivisor => write!(f, "scale denominator is zero"),
            Self::UnorderedBounds => write!(f, "bucket bounds must be strictly increasing"),
            Self::DigitCount {
                requested,
                capacity,
            } => write!(
                f,
                "invalid digit count: {} requested, display holds {}",
                requested, capacity
            ),
        }
    }
}

/// A command byte that maps to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    InvalidKey(u8),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(_) => write!(f, "invalid key"),
        }
    }
}

/// Prints a configuration error and, when a buzzer is wired, sounds it for
/// `duration`. The caller skips whatever needed the configuration and keeps
/// running.
pub async fn alarm<B: Switch>(
    error: &ConfigurationError,
    buzzer: Option<&mut B>,
    duration: Duration,
) {
    rprintln!("config: {}", error);
    if let Some(buzzer) = buzzer {
        buzzer.set(true);
        Timer::after(duration).await;
        buzzer.set(false);
    }
}
