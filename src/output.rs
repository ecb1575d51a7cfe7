//! # Output Module
//!
//! Digital outputs driven from inside the stages: indicator banks that show
//! a bucket, and actuators (pumps, relays) that switch on inside a band of
//! the derived value and then hold for a settle duration.
use core::ops::Range;

use embassy_time::{Duration, Timer};

use crate::state::Derived;

/// One on/off line: LED, relay, buzzer, display segment.
pub trait Switch {
    fn set(&mut self, on: bool);
}

impl<S: Switch + ?Sized> Switch for &mut S {
    fn set(&mut self, on: bool) {
        (**self).set(on)
    }
}

/// Something that can show a bucket id.
pub trait Indicator {
    fn show(&mut self, bucket: usize);
    fn off(&mut self);
}

/// No indicators wired.
impl Indicator for () {
    fn show(&mut self, _bucket: usize) {}
    fn off(&mut self) {}
}

/// Bar-graph bank: bucket `n` lights the first `n` lines.
///
/// With bounds `[10, 20, 30]` and three LEDs, 5 cm is dark, 15 cm lights
/// LED 1, 25 cm LEDs 1 and 2, and 35 cm all three.
pub struct LedBank<S, const N: usize> {
    leds: [S; N],
}

impl<S: Switch, const N: usize> LedBank<S, N> {
    pub fn new(leds: [S; N]) -> Self {
        let mut bank = Self { leds };
        bank.off();
        bank
    }
}

impl<S: Switch, const N: usize> Indicator for LedBank<S, N> {
    fn show(&mut self, bucket: usize) {
        for (i, led) in self.leds.iter_mut().enumerate() {
            led.set(i < bucket);
        }
    }

    fn off(&mut self) {
        for led in self.leds.iter_mut() {
            led.set(false);
        }
    }
}

/// Drives the physical actuators of a measuring stage.
#[allow(async_fn_in_trait)]
pub trait Actuate {
    /// Switches every actuator for `value`. May sleep for a settle period,
    /// blocking only the calling task.
    async fn drive(&mut self, value: Derived);
    /// De-energizes everything.
    fn off(&mut self);
}

impl Actuate for () {
    async fn drive(&mut self, _value: Derived) {}
    fn off(&mut self) {}
}

/// A switch that is on while the derived value sits in `band`.
pub struct Actuator<S> {
    band: Range<Derived>,
    switch: S,
    settle: Duration,
}

impl<S: Switch> Actuator<S> {
    pub fn new(band: Range<Derived>, mut switch: S, settle: Duration) -> Self {
        switch.set(false);
        Self {
            band,
            switch,
            settle,
        }
    }

    /// Returns whether the actuator is now on.
    fn apply(&mut self, value: Derived) -> bool {
        let on = self.band.contains(&value);
        self.switch.set(on);
        on
    }
}

/// Independent bands, e.g. water pump when dry, acid pump above pH 6.7,
/// base pump below pH 6.0. Each band is evaluated on its own; several may
/// be on at once.
pub struct Actuators<S, const N: usize> {
    items: [Actuator<S>; N],
}

impl<S: Switch, const N: usize> Actuators<S, N> {
    pub fn new(items: [Actuator<S>; N]) -> Self {
        Self { items }
    }
}

impl<S: Switch, const N: usize> Actuate for Actuators<S, N> {
    async fn drive(&mut self, value: Derived) {
        let mut settle = None;
        for item in self.items.iter_mut() {
            if item.apply(value) {
                settle = settle.max(Some(item.settle));
            }
        }
        if let Some(settle) = settle {
            Timer::after(settle).await;
        }
    }

    fn off(&mut self) {
        for item in self.items.iter_mut() {
            item.switch.set(false);
        }
    }
}
