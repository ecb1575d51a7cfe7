//! # Reporting Module
//!
//! Formats the latest derived value for each configured sink and sends it,
//! fire-and-forget.
//!
//! ## Wire formats
//!
//! - Serial text, human readable: `<label>: <value> <unit>\r\n`
//! - Serial text, machine readable: `<value>\r\n`
//! - Telemetry frames, one per field: `*<tag><value>\n*`, with `D` for the
//!   current value, `M` for the minimum and `P` for the maximum
//!
//! ## Gating
//!
//! | enabled | hold  | emitted                          |
//! |:-------:|:-----:|:---------------------------------|
//! | false   | -     | the fixed "disabled" report      |
//! | true    | false | current value and extrema        |
//! | true    | true  | nothing; the last value stays up |
use core::fmt::Write as _;

use heapless::String;
use rtt_target::rprintln;

use crate::classify::Buckets;
use crate::error::ConfigurationError;
use crate::notify::Notifier;
use crate::state::{Derived, Extrema, SharedState, IDLE_DERIVED};

/// Longest line any sink formats.
const LINE: usize = 64;
/// Longest telemetry frame: marker, 4-byte tag, 10 digits, terminator.
const FRAME: usize = 17;

/// Byte transport under a sink: UART, RTT channel, BLE characteristic.
pub trait Transport {
    fn send(&mut self, text: &str);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, text: &str) {
        (**self).send(text)
    }
}

/// A display unit and its integer ratio to the derived quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitScale {
    name: &'static str,
    num: i32,
    den: i32,
}

impl UnitScale {
    /// The derived quantity itself, ratio 1:1.
    pub const fn base(name: &'static str) -> Self {
        Self { name, num: 1, den: 1 }
    }

    /// A unit worth `num / den` of the derived quantity, e.g. inches from
    /// centimetres as `39 / 100`.
    pub const fn new(name: &'static str, num: i32, den: i32) -> Result<Self, ConfigurationError> {
        if den == 0 {
            return Err(ConfigurationError::ZeroDivisor);
        }
        Ok(Self { name, num, den })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn convert(&self, value: Derived) -> Derived {
        (i64::from(value) * i64::from(self.num) / i64::from(self.den)) as Derived
    }
}

/// The unit pair a deployment can toggle between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Units {
    pub primary: UnitScale,
    pub alternate: Option<UnitScale>,
}

impl Units {
    pub fn select(&self, alternate: bool) -> UnitScale {
        match (alternate, self.alternate) {
            (true, Some(unit)) => unit,
            _ => self.primary,
        }
    }
}

/// What a sink is asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Acquisition is off.
    Disabled,
    /// Current value, already converted to `unit`, with extrema in the
    /// same unit.
    Live {
        value: Derived,
        extrema: Option<(Derived, Derived)>,
        unit: &'static str,
    },
    /// Out-of-band request for the maximum so far.
    Max { value: Derived, unit: &'static str },
}

impl Report {
    /// Builds the live report for the state's current unit.
    pub fn live(state: &SharedState, units: &Units) -> Self {
        let unit = units.select(state.alternate_unit());
        Self::Live {
            value: unit.convert(state.derived()),
            extrema: state
                .extrema()
                .map(|Extrema { min, max }| (unit.convert(min.value), unit.convert(max.value))),
            unit: unit.name,
        }
    }

    /// `None` until something has been measured.
    pub fn max(state: &SharedState, units: &Units) -> Option<Self> {
        let unit = units.select(state.alternate_unit());
        state.extrema().map(|extrema| Self::Max {
            value: unit.convert(extrema.max.value),
            unit: unit.name,
        })
    }
}

/// A consumer of reports.
pub trait Sink {
    fn emit(&mut self, report: &Report);
}

impl Sink for () {
    fn emit(&mut self, _report: &Report) {}
}

impl<A: Sink, B: Sink> Sink for (A, B) {
    fn emit(&mut self, report: &Report) {
        self.0.emit(report);
        self.1.emit(report);
    }
}

impl<A: Sink, B: Sink, C: Sink> Sink for (A, B, C) {
    fn emit(&mut self, report: &Report) {
        self.0.emit(report);
        self.1.emit(report);
        self.2.emit(report);
    }
}

/// Newline-terminated ASCII lines.
///
/// A unit-less quantity prints without the trailing unit separator, and a
/// sink given state names prints the name of the value's bucket instead of
/// the number:
///
/// ```text
/// Angle: 75 deg
/// Soil humidity: low
/// Water pump: on
/// ```
pub struct SerialText<T> {
    transport: T,
    label: &'static str,
    disabled: &'static str,
    machine: bool,
    states: Option<(Buckets<'static>, &'static [&'static str])>,
}

impl<T: Transport> SerialText<T> {
    /// `<label>: <value> <unit>` lines.
    pub fn new(transport: T, label: &'static str, disabled: &'static str) -> Self {
        Self {
            transport,
            label,
            disabled,
            machine: false,
            states: None,
        }
    }

    /// Bare `<value>` lines for plotting tools.
    pub fn machine(transport: T, disabled: &'static str) -> Self {
        Self {
            machine: true,
            ..Self::new(transport, "", disabled)
        }
    }

    /// Names live values by bucket: `names[buckets.classify(value)]`.
    /// Buckets without a name fall back to the number.
    pub fn with_states(
        mut self,
        buckets: Buckets<'static>,
        names: &'static [&'static str],
    ) -> Self {
        self.states = Some((buckets, names));
        self
    }

    fn state(&self, value: Derived) -> Option<&'static str> {
        let (buckets, names) = self.states?;
        names.get(buckets.classify(value)).copied()
    }

    fn line(&mut self, args: core::fmt::Arguments<'_>) {
        let mut text = String::<LINE>::new();
        if text.write_fmt(args).is_err() {
            rprintln!("serial: line truncated");
        }
        self.transport.send(&text);
    }

    fn quantity(&mut self, suffix: &str, value: Derived, unit: &str) {
        let label = self.label;
        if unit.is_empty() {
            self.line(format_args!("{}{}: {}\r\n", label, suffix, value));
        } else {
            self.line(format_args!("{}{}: {} {}\r\n", label, suffix, value, unit));
        }
    }
}

impl<T: Transport> Sink for SerialText<T> {
    fn emit(&mut self, report: &Report) {
        match *report {
            Report::Disabled => {
                let disabled = self.disabled;
                self.line(format_args!("{}\r\n", disabled));
            }
            Report::Live { value, .. } if self.machine => {
                self.line(format_args!("{}\r\n", value));
            }
            Report::Live { value, unit, .. } => match self.state(value) {
                Some(state) => {
                    let label = self.label;
                    self.line(format_args!("{}: {}\r\n", label, state));
                }
                None => self.quantity("", value, unit),
            },
            Report::Max { value, unit } => self.quantity(" max", value, unit),
        }
    }
}

/// Field tags of telemetry frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tags {
    pub current: char,
    pub min: char,
    pub max: char,
}

impl Default for Tags {
    fn default() -> Self {
        Self {
            current: 'D',
            min: 'M',
            max: 'P',
        }
    }
}

/// Marker frames for a phone telemetry dashboard.
pub struct Telemetry<T> {
    transport: T,
    tags: Tags,
}

impl<T: Transport> Telemetry<T> {
    pub fn new(transport: T, tags: Tags) -> Self {
        Self { transport, tags }
    }

    fn frame(&mut self, tag: char, value: Derived) {
        let mut text = String::<FRAME>::new();
        if write!(text, "*{}{}\n*", tag, u32::try_from(value).unwrap_or(0)).is_err() {
            rprintln!("telemetry: frame truncated");
            return;
        }
        self.transport.send(&text);
    }
}

impl<T: Transport> Sink for Telemetry<T> {
    fn emit(&mut self, report: &Report) {
        match *report {
            Report::Disabled => self.frame(self.tags.current, IDLE_DERIVED),
            Report::Live { value, extrema, .. } => {
                self.frame(self.tags.current, value);
                if let Some((min, max)) = extrema {
                    self.frame(self.tags.min, min);
                    self.frame(self.tags.max, max);
                }
            }
            Report::Max { value, .. } => self.frame(self.tags.max, value),
        }
    }
}

/// The reporting task.
///
/// Wakes on its notifier and hands one [`Report`] to its sink, gated by the
/// enabled and hold flags as tabled in the module docs. While held it sends
/// nothing, so whatever the sinks show last stays up.
pub struct Reporter<'a, S> {
    sink: S,
    state: &'a SharedState,
    units: Units,
    wake: &'a Notifier,
    shown: Option<Derived>,
}

impl<'a, S: Sink> Reporter<'a, S> {
    /// Creates a reporter.
    ///
    /// # Arguments
    ///
    /// * `sink` - where reports go; a tuple fans out to several
    /// * `state` - shared state read on every wake
    /// * `units` - primary and alternate display units
    /// * `wake` - the notifier this task waits on, posted either by the
    ///   measuring task or by its own tick
    ///
    /// # Examples
    ///
    /// ```text
    /// let sinks = (SerialText::new(uart, "Angle", "Measurement disabled"), telemetry);
    /// let reporter = Reporter::new(sinks, &STATE, DEGREES, &REPORT_WAKE);
    /// reporter.run().await;
    /// ```
    pub fn new(sink: S, state: &'a SharedState, units: Units, wake: &'a Notifier) -> Self {
        Self {
            sink,
            state,
            units,
            wake,
            shown: None,
        }
    }

    /// Value currently on the sinks, `None` while disabled or before the
    /// first live report.
    pub fn shown(&self) -> Option<Derived> {
        self.shown
    }

    /// One wake.
    pub fn report(&mut self) {
        if !self.state.enabled() {
            self.sink.emit(&Report::Disabled);
            self.shown = None;
            return;
        }
        if self.state.hold() {
            return;
        }
        let report = Report::live(self.state, &self.units);
        if let Report::Live { value, .. } = report {
            self.shown = Some(value);
        }
        self.sink.emit(&report);
    }

    pub async fn run(mut self) -> ! {
        loop {
            self.wake.wait().await;
            self.report();
        }
    }
}
