//! Periodic tick source standing in for a hardware timer callback.
use embassy_futures::join::join;
use embassy_time::{Duration, Ticker};

use crate::config::MeterConfig;
use crate::notify::Notifier;

/// Posts to every target once per `period`, in order. Put the measuring
/// task first when several stages share one tick.
pub async fn drive(period: Duration, targets: &[&Notifier]) -> ! {
    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        for target in targets {
            target.post();
        }
    }
}

/// Ticks one deployment. The measuring task wakes every `sample_period`;
/// an unchained reporter passed as `report` wakes every `report_period`.
/// Pass `None` when the measuring task chains to the reporter itself.
///
/// ```text
/// join(tick::schedule(&IRRIGATION, &MEASURE_WAKE, Some(&REPORT_WAKE)), ...)
/// ```
pub async fn schedule(config: &MeterConfig, measure: &Notifier, report: Option<&Notifier>) -> ! {
    match report {
        Some(report) => {
            let (never, _) = join(
                drive(config.sample_period, &[measure]),
                drive(config.report_period, &[report]),
            )
            .await;
            never
        }
        None => drive(config.sample_period, &[measure]).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IRRIGATION;
    use embassy_futures::select::{select, Either};
    use embassy_time::Timer;

    #[test]
    fn ticks_post_to_all_targets() {
        let measure = Notifier::new();
        let report = Notifier::new();
        let targets = [&measure, &report];
        let outcome = embassy_futures::block_on(select(
            drive(Duration::from_millis(5), &targets),
            Timer::after(Duration::from_millis(30)),
        ));
        assert!(matches!(outcome, Either::Second(())));
        assert!(measure.is_pending());
        assert!(report.is_pending());
    }

    #[test]
    fn report_tick_follows_its_own_period() {
        let config = MeterConfig {
            sample_period: Duration::from_millis(5),
            report_period: Duration::from_millis(100),
            ..IRRIGATION
        };
        let measure = Notifier::new();
        let report = Notifier::new();
        embassy_futures::block_on(select(
            schedule(&config, &measure, Some(&report)),
            Timer::after(Duration::from_millis(30)),
        ));
        assert!(measure.is_pending());
        assert!(!report.is_pending());

        embassy_futures::block_on(select(
            schedule(&config, &measure, Some(&report)),
            Timer::after(Duration::from_millis(120)),
        ));
        assert!(report.is_pending());
    }

    #[test]
    fn chained_schedule_leaves_reporter_alone() {
        let config = MeterConfig {
            sample_period: Duration::from_millis(5),
            ..IRRIGATION
        };
        let measure = Notifier::new();
        let report = Notifier::new();
        embassy_futures::block_on(select(
            schedule(&config, &measure, None),
            Timer::after(Duration::from_millis(30)),
        ));
        assert!(measure.is_pending());
        assert!(!report.is_pending());
    }
}
