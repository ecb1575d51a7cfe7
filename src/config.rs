//! Deployment configuration.
//!
//! Each demo is one [`MeterConfig`] value rather than its own copy of the
//! pipeline. Presets are `const` and validated at compile time.
use core::ops::{Range, RangeInclusive};

use embassy_time::Duration;

use crate::classify::{Buckets, Calibration, Derivation};
use crate::mode::{Button, Command};
use crate::output::{Actuator, Switch};
use crate::report::{SerialText, Transport, UnitScale, Units};
use crate::state::{Derived, Sample};

/// What happens to the running min/max around hold and re-enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtremaPolicy {
    /// Keep widening extrema while the display is held.
    pub track_during_hold: bool,
    /// Forget extrema when measurement is switched back on.
    pub reset_on_enable: bool,
}

impl Default for ExtremaPolicy {
    fn default() -> Self {
        Self {
            track_during_hold: true,
            reset_on_enable: false,
        }
    }
}

/// Bounds of the adjustable playback/sampling period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodControl {
    pub default_us: u32,
    pub min_us: u32,
    pub max_us: u32,
}

/// One deployment: timing, calibration, classification and reporting.
///
/// A firmware image picks one preset and builds its stages from it:
///
/// ```text
/// let acquisition = Acquisition::new(sensor, &STATE, CONFIG.raw_bounds.clone());
/// let measure = Measure::new(acquisition, &STATE, CONFIG.derivation, &MEASURE_WAKE)
///     .with_actuators(Actuators::new([CONFIG.pump(relay)?]));
/// let reporter = Reporter::new(CONFIG.serial(uart), &STATE, CONFIG.units, &REPORT_WAKE);
/// ```
///
/// # Fields
///
/// - `sample_period`: tick of the measuring task
/// - `report_period`: tick of the reporting task when it runs on its own
///   tick instead of being chained; see [`chained`](Self::chained)
/// - `raw_bounds`: calibrated travel of the sensor, readings are clamped
///   into it
/// - `states`: names of the buckets, printed instead of the value
/// - `pump_band`: derived values in which the actuator runs, held on for
///   `settle` after each switch-on
pub struct MeterConfig {
    pub sample_period: Duration,
    pub report_period: Duration,
    /// Button poll period.
    pub poll_period: Duration,
    pub raw_bounds: Option<RangeInclusive<Sample>>,
    pub derivation: Derivation,
    pub buckets: Option<Buckets<'static>>,
    pub states: &'static [&'static str],
    pub units: Units,
    pub extrema: ExtremaPolicy,
    /// Serial label for the live value.
    pub label: &'static str,
    /// Serial line while disabled.
    pub disabled: &'static str,
    pub period: PeriodControl,
    pub pump_band: Option<Range<Derived>>,
    pub settle: Duration,
}

impl MeterConfig {
    /// Whether the reporter rides on the measuring tick. Otherwise it gets
    /// its own `report_period` tick and shows whatever was measured last.
    pub fn chained(&self) -> bool {
        self.report_period == self.sample_period
    }

    /// Serial text sink with this deployment's label, disabled line and
    /// state names.
    pub fn serial<T: Transport>(&self, transport: T) -> SerialText<T> {
        let serial = SerialText::new(transport, self.label, self.disabled);
        match self.buckets {
            Some(buckets) if !self.states.is_empty() => serial.with_states(buckets, self.states),
            _ => serial,
        }
    }

    /// The pump on `switch`, if this deployment drives one.
    pub fn pump<S: Switch>(&self, switch: S) -> Option<Actuator<S>> {
        let band = self.pump_band.clone()?;
        Some(Actuator::new(band, switch, self.settle))
    }
}

const fn linear(input: RangeInclusive<Sample>, output: RangeInclusive<Derived>) -> Derivation {
    match Calibration::new(input, output) {
        Ok(calibration) => Derivation::Linear(calibration),
        Err(_) => panic!("invalid calibration"),
    }
}

const fn scale(num: i32, den: i32) -> Derivation {
    match Derivation::scale(num, den) {
        Ok(derivation) => derivation,
        Err(_) => panic!("invalid scale"),
    }
}

const fn unit(name: &'static str, num: i32, den: i32) -> Option<UnitScale> {
    match UnitScale::new(name, num, den) {
        Ok(unit) => Some(unit),
        Err(_) => panic!("invalid unit ratio"),
    }
}

const fn buckets(bounds: &'static [Derived]) -> Option<Buckets<'static>> {
    match Buckets::new(bounds) {
        Ok(buckets) => Some(buckets),
        Err(_) => panic!("invalid bucket bounds"),
    }
}

/// Playback and sampling period used when nothing else is configured.
pub const DEFAULT_PERIOD: PeriodControl = PeriodControl {
    default_us: 4000,
    min_us: 500,
    max_us: 100_000,
};

pub const CENTIMETRES: Units = Units {
    primary: UnitScale::base("cm"),
    alternate: unit("in", 39, 100),
};

pub const DEGREES: Units = Units {
    primary: UnitScale::base("deg"),
    alternate: unit("mrad", 1745, 100),
};

/// Potentiometer electrogoniometer on the elbow: 735 mV at full extension,
/// 2535 mV at 150 degrees of flexion.
pub const GONIOMETER: MeterConfig = MeterConfig {
    sample_period: Duration::from_millis(20),
    report_period: Duration::from_millis(20),
    poll_period: Duration::from_millis(50),
    raw_bounds: Some(735..=2535),
    derivation: linear(735..=2535, 0..=150),
    buckets: buckets(&[50, 100, 150]),
    states: &[],
    units: DEGREES,
    extrema: ExtremaPolicy {
        track_during_hold: true,
        reset_on_enable: false,
    },
    label: "Angle",
    disabled: "Measurement disabled",
    period: DEFAULT_PERIOD,
    pump_band: None,
    settle: Duration::from_millis(0),
};

/// Ultrasonic distance meter with a three-LED bar graph.
pub const DISTANCE: MeterConfig = MeterConfig {
    sample_period: Duration::from_secs(1),
    report_period: Duration::from_secs(1),
    poll_period: Duration::from_millis(200),
    raw_bounds: None,
    derivation: Derivation::Identity,
    buckets: buckets(&[10, 20, 30]),
    states: &[],
    units: CENTIMETRES,
    extrema: ExtremaPolicy {
        track_during_hold: true,
        reset_on_enable: false,
    },
    label: "Distance",
    disabled: "Measurement disabled",
    period: DEFAULT_PERIOD,
    pump_band: None,
    settle: Duration::from_millis(0),
};

/// Slotted-wheel odometer: 20 slots on a 15 cm radius wheel, 4.71 cm per
/// pulse.
pub const ODOMETER: MeterConfig = MeterConfig {
    sample_period: Duration::from_millis(20),
    report_period: Duration::from_secs(1),
    poll_period: Duration::from_millis(1),
    raw_bounds: None,
    derivation: scale(471, 100),
    buckets: None,
    states: &[],
    units: CENTIMETRES,
    extrema: ExtremaPolicy {
        track_during_hold: true,
        reset_on_enable: true,
    },
    label: "Distance",
    disabled: "Measurement disabled",
    period: DEFAULT_PERIOD,
    pump_band: None,
    settle: Duration::from_millis(0),
};

/// Soil humidity comparator driving a water pump. The sensor reads 1 when
/// the soil is dry.
pub const IRRIGATION: MeterConfig = MeterConfig {
    sample_period: Duration::from_secs(3),
    report_period: Duration::from_secs(5),
    poll_period: Duration::from_millis(1),
    raw_bounds: Some(0..=1),
    derivation: Derivation::Identity,
    buckets: buckets(&[1]),
    states: &["ok", "dry"],
    units: Units {
        primary: UnitScale::base(""),
        alternate: None,
    },
    extrema: ExtremaPolicy {
        track_during_hold: true,
        reset_on_enable: false,
    },
    label: "Soil",
    disabled: "System disabled",
    period: DEFAULT_PERIOD,
    pump_band: Some(1..2),
    settle: Duration::from_secs(1),
};

/// ECG trace playback: 4 ms per sample by default.
pub const ECG_PLAYBACK: PeriodControl = PeriodControl {
    default_us: 4000,
    min_us: 1000,
    max_us: 20_000,
};

/// Switch steps of the playback demo, 1 ms per press.
pub const ECG_SWITCHES: &[(Button, Command)] = &[
    (Button::A, Command::AdjustPeriod(1000)),
    (Button::B, Command::AdjustPeriod(-1000)),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::tests::Script;
    use crate::acquire::{Acquisition, Level};
    use crate::measure::Measure;
    use crate::notify::Notifier;
    use crate::output::tests::Line;
    use crate::output::Actuators;
    use crate::report::tests::Capture;
    use crate::report::{Report, Reporter, Sink};
    use crate::state::SharedState;
    use embassy_futures::block_on;
    use embassy_time::Instant;

    #[test]
    fn goniometer_preset_maps_calibrated_travel() {
        assert_eq!(GONIOMETER.derivation.derive(735), 0);
        assert_eq!(GONIOMETER.derivation.derive(1635), 75);
        assert_eq!(GONIOMETER.derivation.derive(2535), 150);
    }

    #[test]
    fn distance_preset_uses_bar_graph_bounds() {
        let buckets = DISTANCE.buckets.unwrap();
        assert_eq!(buckets.classify(15), 1);
        assert_eq!(DISTANCE.units.select(true).convert(100), 39);
    }

    #[test]
    fn irrigation_reports_status_and_runs_pump() {
        // Same deployment with a short settle to keep the test quick.
        let config = MeterConfig {
            settle: Duration::from_millis(5),
            ..IRRIGATION
        };
        let state = SharedState::new(0);
        let wake = Notifier::new();
        let report = Notifier::new();
        let pump = Line::default();
        let out = Capture::default();
        state.set_enabled(true);

        let soil = Level::new(Script::new(&[1, 0]));
        let acquisition = Acquisition::new(soil, &state, config.raw_bounds.clone());
        let actuator = config.pump(pump.clone()).unwrap();
        let mut measure = Measure::new(acquisition, &state, config.derivation, &wake)
            .with_actuators(Actuators::new([actuator]));
        let mut reporter = Reporter::new(config.serial(out.clone()), &state, config.units, &report);

        let start = Instant::now();
        block_on(measure.cycle());
        assert!(start.elapsed() >= config.settle);
        assert!(pump.level());
        reporter.report();

        block_on(measure.cycle());
        assert!(!pump.level());
        reporter.report();

        state.set_enabled(false);
        reporter.report();
        assert_eq!(out.take(), ["Soil: dry\r\n", "Soil: ok\r\n", "System disabled\r\n"]);
    }

    #[test]
    fn only_irrigation_drives_a_pump() {
        assert!(GONIOMETER.pump(Line::default()).is_none());
        assert!(DISTANCE.pump(Line::default()).is_none());
        assert!(IRRIGATION.pump(Line::default()).is_some());
    }

    #[test]
    fn slow_status_runs_on_its_own_tick() {
        assert!(GONIOMETER.chained());
        assert!(DISTANCE.chained());
        assert!(!ODOMETER.chained());
        assert!(!IRRIGATION.chained());
    }

    #[test]
    fn numeric_presets_print_values() {
        let out = Capture::default();
        let mut serial = GONIOMETER.serial(out.clone());
        serial.emit(&Report::Live {
            value: 75,
            extrema: None,
            unit: "deg",
        });
        assert_eq!(out.take(), ["Angle: 75 deg\r\n"]);
    }

    #[test]
    fn odometer_forgets_distance_on_restart() {
        assert!(ODOMETER.extrema.reset_on_enable);
        assert_eq!(ODOMETER.derivation.derive(20), 94);
    }
}
