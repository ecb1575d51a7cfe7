#![no_std]
#![no_main]

mod knob;
mod leds;
mod ui;

pub use knob::*;
pub use leds::*;
pub use ui::*;

use panic_rtt_target as _;
use rtt_target::{rprint, rprintln, rtt_init, set_print_channel, DownChannel, UpChannel};

use embassy_executor::Spawner;
use embassy_futures::join;
use embassy_time::{Duration, Timer};
use microbit_bsp::{
    embassy_nrf::{
        bind_interrupts,
        gpio::{AnyPin, Level, Output, OutputDrive},
        saadc,
    },
    Button, Microbit,
};

use meter::{
    acquire::{Acquisition, Sensor},
    bcd::BcdDisplay,
    config::{MeterConfig, GONIOMETER},
    measure::Measure,
    mode::{self, ModeController, Request},
    output::{LedBank, Switch},
    report::{Report, Reporter, SerialText, Sink, Tags, Telemetry, Transport, Units},
    tick, Notifier, Sample, SharedState,
};

/// The deployment this image runs: elbow goniometer with a three-LED bar
/// graph on P9, P8 and P16, the potentiometer wiper on P2, and a 3-digit
/// BCD display with data on P0, P1, P12, P13 and digit selects on P14, P15,
/// P19.
static CONFIG: MeterConfig = GONIOMETER;

static STATE: SharedState = SharedState::new(GONIOMETER.period.default_us);
static MEASURE_WAKE: Notifier = Notifier::new();
static REPORT_WAKE: Notifier = Notifier::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let channels = rtt_init! {
        up: {
            0: {
                size: 1024,
                name: "Terminal"
            }
            1: {
                size: 256,
                name: "Telemetry"
            }
        }
        down: {
            0: {
                size: 16,
                name: "Keypad"
            }
        }
    };
    set_print_channel(channels.up.0);
    let board = Microbit::default();

    bind_interrupts!(struct Irqs {
        SAADC => saadc::InterruptHandler;
    });

    let bar = LedBank::new([
        Led::new(AnyPin::from(board.p9)),
        Led::new(AnyPin::from(board.p8)),
        Led::new(AnyPin::from(board.p16)),
    ]);

    let mut saadc_config = saadc::Config::default();
    saadc_config.resolution = saadc::Resolution::_14BIT;
    let saadc = saadc::Saadc::new(
        board.saadc,
        Irqs,
        saadc_config,
        [saadc::ChannelConfig::single_ended(board.p2)],
    );
    let knob = Knob::new(saadc).await;

    let Some(buckets) = CONFIG.buckets else {
        panic!("bar graph needs bucket bounds");
    };
    let acquisition = Acquisition::new(knob, &STATE, CONFIG.raw_bounds.clone());
    let measure = Measure::new(acquisition, &STATE, CONFIG.derivation, &MEASURE_WAKE)
        .with_indicator(buckets, bar)
        .with_extrema(CONFIG.extrema);
    // A reporter on the measuring cadence is chained, a slower one gets its
    // own tick.
    let (measure, report_tick) = if CONFIG.chained() {
        (measure.chain(&REPORT_WAKE), None)
    } else {
        (measure, Some(&REPORT_WAKE))
    };

    let display: BcdDisplay<Led, 3> = BcdDisplay::new(
        [
            Led::new(AnyPin::from(board.p0)),
            Led::new(AnyPin::from(board.p1)),
            Led::new(AnyPin::from(board.p12)),
            Led::new(AnyPin::from(board.p13)),
        ],
        [
            Led::new(AnyPin::from(board.p14)),
            Led::new(AnyPin::from(board.p15)),
            Led::new(AnyPin::from(board.p19)),
        ],
    );

    let sinks = (
        CONFIG.serial(Terminal),
        Telemetry::new(TelemetryChannel(channels.up.1), Tags::default()),
        display,
    );
    let reporter = Reporter::new(sinks, &STATE, CONFIG.units, &REPORT_WAKE);

    let mode = ModeController::new(&STATE, CONFIG.period, CONFIG.extrema);
    let mut ui = Ui::new(
        mode,
        (board.btn_a, board.btn_b),
        channels.down.0,
        &STATE,
        &CONFIG,
    );

    rprintln!("{}: press A to start, B to stop", CONFIG.label);

    join::join4(
        tick::schedule(&CONFIG, &MEASURE_WAKE, report_tick),
        measure.run(),
        reporter.run(),
        ui.run(),
    )
    .await;

    panic!("fell off end of main loop");
}
