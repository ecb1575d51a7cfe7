//! # Acquisition Module
//!
//! Reads one external input per wake and publishes it as the latest
//! [`Sample`].
//!
//! The stage has two states, keyed off the shared `enabled` flag:
//!
//! - **Idle**: the sensor is told to power down and reset, the input is not
//!   read, and the latest sample is forced to [`IDLE_SAMPLE`].
//! - **Acquiring**: the input is read exactly once and, when raw bounds are
//!   configured, clamped into them before it is stored. A potentiometer
//!   strapped to an elbow slips past its calibrated travel; the clamp keeps
//!   those readings at the nearest end instead of reporting them.
use core::ops::RangeInclusive;

use crate::state::{Sample, SharedState, IDLE_SAMPLE};

/// A source of raw samples.
#[allow(async_fn_in_trait)]
pub trait Sensor {
    /// Takes one reading.
    async fn read(&mut self) -> Sample;

    /// Called instead of [`read`](Sensor::read) while acquisition is
    /// disabled. Power the sensor down and drop any accumulated state.
    fn idle(&mut self) {}
}

/// A polled digital input line.
pub trait DigitalInput {
    fn is_high(&mut self) -> bool;
}

/// Reports the level of a digital line as `0` or `1`, e.g. a soil humidity
/// comparator that goes high when the soil is dry.
pub struct Level<P> {
    pin: P,
}

impl<P: DigitalInput> Level<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: DigitalInput> Sensor for Level<P> {
    async fn read(&mut self) -> Sample {
        Sample::from(self.pin.is_high())
    }
}

/// Pulse accumulator for slotted-wheel odometers.
///
/// Counts rising edges only: a wheel parked with a slot in front of the
/// optical sensor reads high on every poll, and that must not keep adding
/// distance.
pub struct EdgeCounter<P> {
    pin: P,
    previous: bool,
    total: Sample,
}

impl<P: DigitalInput> EdgeCounter<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            previous: false,
            total: 0,
        }
    }

    pub fn total(&self) -> Sample {
        self.total
    }
}

impl<P: DigitalInput> Sensor for EdgeCounter<P> {
    async fn read(&mut self) -> Sample {
        let current = self.pin.is_high();
        if current && !self.previous {
            self.total = self.total.saturating_add(1);
        }
        self.previous = current;
        self.total
    }

    fn idle(&mut self) {
        self.total = 0;
        self.previous = false;
    }
}

/// The acquisition stage: one sensor, its calibration bounds, and the
/// shared state it publishes into.
pub struct Acquisition<'a, S> {
    sensor: S,
    state: &'a SharedState,
    bounds: Option<RangeInclusive<Sample>>,
}

impl<'a, S: Sensor> Acquisition<'a, S> {
    pub fn new(sensor: S, state: &'a SharedState, bounds: Option<RangeInclusive<Sample>>) -> Self {
        Self {
            sensor,
            state,
            bounds,
        }
    }

    /// Runs one wake. Returns the stored sample while enabled, `None` while
    /// idle.
    ///
    /// The flag is checked again once the read completes: a sample whose
    /// read straddled a disable is dropped and the stage idles instead.
    pub async fn acquire(&mut self) -> Option<Sample> {
        if self.state.enabled() {
            let sample = self.sensor.read().await;
            if self.state.enabled() {
                let sample = match &self.bounds {
                    Some(bounds) => sample.clamp(*bounds.start(), *bounds.end()),
                    None => sample,
                };
                self.state.store_sample(sample);
                return Some(sample);
            }
        }
        self.sensor.idle();
        self.state.store_sample(IDLE_SAMPLE);
        None
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }
}
