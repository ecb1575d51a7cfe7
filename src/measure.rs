//! Measuring task: acquisition, classification and the outputs they drive.
//!
//! One wake runs the whole chain and then wakes the reporting task itself,
//! so the reporter always sees the value from this cycle and never a stale
//! one from the previous cycle.
use crate::acquire::{Acquisition, Sensor};
use crate::classify::{Buckets, Derivation};
use crate::config::ExtremaPolicy;
use crate::notify::Notifier;
use crate::output::{Actuate, Indicator};
use crate::state::{Reading, SharedState, IDLE_DERIVED};

/// The measuring task.
///
/// Built from an [`Acquisition`] and a [`Derivation`], then optionally
/// given an indicator bank, actuators and a reporter to chain to:
///
/// ```text
/// let measure = Measure::new(acquisition, &STATE, GONIOMETER.derivation, &MEASURE_WAKE)
///     .with_indicator(buckets, bar)
///     .chain(&REPORT_WAKE);
/// join(measure.run(), reporter.run()).await;
/// ```
///
/// Each wake runs [`cycle`](Self::cycle) once:
///
/// 1. acquire one sample, or idle while disabled
/// 2. derive and publish the value
/// 3. light its bucket and widen the extrema
/// 4. wake the reporter
/// 5. switch the actuators and wait out their settle time
pub struct Measure<'a, S, I = (), A = ()> {
    acquisition: Acquisition<'a, S>,
    state: &'a SharedState,
    derivation: Derivation,
    buckets: Option<Buckets<'a>>,
    indicator: I,
    actuators: A,
    extrema: ExtremaPolicy,
    wake: &'a Notifier,
    report: Option<&'a Notifier>,
}

impl<'a, S: Sensor> Measure<'a, S> {
    pub fn new(
        acquisition: Acquisition<'a, S>,
        state: &'a SharedState,
        derivation: Derivation,
        wake: &'a Notifier,
    ) -> Self {
        Self {
            acquisition,
            state,
            derivation,
            buckets: None,
            indicator: (),
            actuators: (),
            extrema: ExtremaPolicy::default(),
            wake,
            report: None,
        }
    }
}

impl<'a, S: Sensor, I: Indicator, A: Actuate> Measure<'a, S, I, A> {
    /// Shows the bucket of every derived value on `indicator`.
    pub fn with_indicator<J: Indicator>(
        self,
        buckets: Buckets<'a>,
        indicator: J,
    ) -> Measure<'a, S, J, A> {
        Measure {
            acquisition: self.acquisition,
            state: self.state,
            derivation: self.derivation,
            buckets: Some(buckets),
            indicator,
            actuators: self.actuators,
            extrema: self.extrema,
            wake: self.wake,
            report: self.report,
        }
    }

    pub fn with_actuators<B: Actuate>(self, actuators: B) -> Measure<'a, S, I, B> {
        Measure {
            acquisition: self.acquisition,
            state: self.state,
            derivation: self.derivation,
            buckets: self.buckets,
            indicator: self.indicator,
            actuators,
            extrema: self.extrema,
            wake: self.wake,
            report: self.report,
        }
    }

    pub fn with_extrema(mut self, extrema: ExtremaPolicy) -> Self {
        self.extrema = extrema;
        self
    }

    /// Wakes `report` at the end of every cycle.
    pub fn chain(mut self, report: &'a Notifier) -> Self {
        self.report = Some(report);
        self
    }

    /// One wake of the chain.
    pub async fn cycle(&mut self) {
        match self.acquisition.acquire().await {
            None => {
                self.state.store_derived(IDLE_DERIVED);
                self.indicator.off();
                self.actuators.off();
                self.notify_report();
            }
            Some(raw) => {
                let value = self.derivation.derive(raw);
                self.state.store_derived(value);
                if let Some(buckets) = &self.buckets {
                    self.indicator.show(buckets.classify(value));
                }
                if self.extrema.track_during_hold || !self.state.hold() {
                    self.state.record_extrema(Reading { raw, value });
                }
                self.notify_report();
                self.actuators.drive(value).await;
            }
        }
    }

    fn notify_report(&self) {
        if let Some(report) = self.report {
            report.post();
        }
    }

    pub async fn run(mut self) -> ! {
        loop {
            self.wake.wait().await;
            self.cycle().await;
        }
    }
}
