//! # Periodic Acquisition & Threshold-Reporting Core
//!
//! Sensor-actuator demos on small boards all share one shape: a hardware
//! tick wakes a measuring task, the task reads one input, maps it to a
//! physical quantity, lights a bank of indicators or runs a pump, and a
//! second task prints the result. Buttons and keypad bytes flip the mode
//! flags both tasks consult.
//!
//! This crate holds that shape once, configured per deployment:
//!
//! - [`notify`]: single-slot wake signal from tick context to a task
//! - [`state`]: the shared mode flags, latest reading and extrema
//! - [`acquire`]: sensors and the acquisition stage
//! - [`classify`]: linear derivation and threshold buckets
//! - [`output`]: indicator banks and settle-timed actuators
//! - [`measure`]: acquisition + classification task, chained to reporting
//! - [`report`]: serial text, telemetry frames and the reporting task
//! - [`mode`]: keypad and button handling
//! - [`bcd`]: BCD conversion and multiplexed display driving
//! - [`playback`]: looping waveform output
//! - [`tick`]: periodic tick source
//! - [`config`]: deployment presets
#![cfg_attr(not(test), no_std)]

pub mod acquire;
pub mod bcd;
pub mod classify;
pub mod config;
pub mod error;
pub mod measure;
pub mod mode;
pub mod notify;
pub mod output;
pub mod playback;
pub mod report;
pub mod state;
pub mod tick;

pub use error::{CommandError, ConfigurationError};
pub use notify::Notifier;
pub use state::{Derived, Extrema, Reading, Sample, SharedState};
