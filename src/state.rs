//! Process-wide state shared by the stages and the mode controller.
//!
//! Every field is touched from more than one task, so each one is an
//! atomic. Extrema are the exception: a min or max is a raw/derived pair
//! and both halves must move together, so they sit behind one critical
//! section.
use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Raw reading as produced by a sensor (millivolts, pulse count, level).
pub type Sample = u32;
/// Physical quantity derived from a sample (degrees, centimetres, pH x100).
pub type Derived = i32;

/// Value stored while acquisition is disabled.
pub const IDLE_SAMPLE: Sample = 0;
/// Value reported while acquisition is disabled.
pub const IDLE_DERIVED: Derived = 0;

/// One raw sample and the quantity derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub raw: Sample,
    pub value: Derived,
}

/// Running minimum and maximum since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extrema {
    pub min: Reading,
    pub max: Reading,
}

impl Extrema {
    fn widen(self, reading: Reading) -> Self {
        let mut next = self;
        if reading.value <= self.min.value {
            next.min = reading;
        }
        if reading.value >= self.max.value {
            next.max = reading;
        }
        next
    }
}

/// State shared by the measuring task, the reporting task and the mode
/// controller.
///
/// Lives in a `static` so every task can hold a `&'static` to it:
///
/// ```text
/// static STATE: SharedState = SharedState::new(4000);
/// ```
///
/// # Fields
///
/// - `enabled`: acquisition runs; while clear every reading is idle
/// - `hold`: the reporter freezes its output, measurement continues
/// - `alternate_unit`: report in the deployment's alternate unit
/// - `last_sample` / `derived`: the latest reading, written only by the
///   measuring task
/// - `period_us`: adjustable playback or sampling period
/// - `extrema`: running min/max, `None` until something was measured
pub struct SharedState {
    enabled: AtomicBool,
    hold: AtomicBool,
    alternate_unit: AtomicBool,
    last_sample: AtomicU32,
    derived: AtomicI32,
    period_us: AtomicU32,
    extrema: Mutex<CriticalSectionRawMutex, Cell<Option<Extrema>>>,
}

impl SharedState {
    /// All flags cleared, readings idle, no extrema. `period_us` seeds the
    /// adjustable period used by playback deployments.
    pub const fn new(period_us: u32) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            alternate_unit: AtomicBool::new(false),
            last_sample: AtomicU32::new(IDLE_SAMPLE),
            derived: AtomicI32::new(IDLE_DERIVED),
            period_us: AtomicU32::new(period_us),
            extrema: Mutex::new(Cell::new(None)),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Returns the previous value.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::Relaxed)
    }

    /// Returns the new value.
    pub fn toggle_enabled(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn hold(&self) -> bool {
        self.hold.load(Ordering::Relaxed)
    }

    pub fn set_hold(&self, hold: bool) {
        self.hold.store(hold, Ordering::Relaxed);
    }

    /// Returns the new value.
    pub fn toggle_hold(&self) -> bool {
        !self.hold.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn alternate_unit(&self) -> bool {
        self.alternate_unit.load(Ordering::Relaxed)
    }

    /// Returns the new value.
    pub fn toggle_unit(&self) -> bool {
        !self.alternate_unit.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn last_sample(&self) -> Sample {
        self.last_sample.load(Ordering::Relaxed)
    }

    pub fn derived(&self) -> Derived {
        self.derived.load(Ordering::Relaxed)
    }

    pub fn reading(&self) -> Reading {
        Reading {
            raw: self.last_sample(),
            value: self.derived(),
        }
    }

    pub(crate) fn store_sample(&self, sample: Sample) {
        self.last_sample.store(sample, Ordering::Relaxed);
    }

    pub(crate) fn store_derived(&self, value: Derived) {
        self.derived.store(value, Ordering::Relaxed);
    }

    pub fn period_us(&self) -> u32 {
        self.period_us.load(Ordering::Relaxed)
    }

    pub fn set_period_us(&self, period_us: u32) {
        self.period_us.store(period_us, Ordering::Relaxed);
    }

    /// Adds `delta` to the period, saturating inside `min..=max`. Returns
    /// the new period.
    pub fn adjust_period_us(&self, delta: i32, min: u32, max: u32) -> u32 {
        let step = |period: u32| {
            let moved = if delta < 0 {
                period.saturating_sub(delta.unsigned_abs())
            } else {
                period.saturating_add(delta.unsigned_abs())
            };
            Some(moved.clamp(min, max))
        };
        match self
            .period_us
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, step)
        {
            Ok(previous) | Err(previous) => step(previous).unwrap_or(previous),
        }
    }

    pub fn extrema(&self) -> Option<Extrema> {
        self.extrema.lock(|cell| cell.get())
    }

    /// Widens the extrema to cover `reading`.
    pub fn record_extrema(&self, reading: Reading) {
        self.extrema.lock(|cell| {
            let next = match cell.get() {
                Some(extrema) => extrema.widen(reading),
                None => Extrema {
                    min: reading,
                    max: reading,
                },
            };
            cell.set(Some(next));
        });
    }

    pub fn reset_extrema(&self) {
        self.extrema.lock(|cell| cell.set(None));
    }
}
