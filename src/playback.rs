//! Waveform playback through an analog output.
//!
//! A stored trace is written one sample per period, looping forever. The
//! period lives in [`SharedState`] so the mode controller can stretch or
//! shrink it while playback runs; the new value takes effect on the next
//! sample.
use embassy_time::{Duration, Timer};

use crate::state::SharedState;

/// An 8-bit DAC or PWM channel.
pub trait AnalogOutput {
    fn write(&mut self, level: u8);
}

/// One heartbeat of ECG, 8-bit samples, meant for 4 ms per sample.
pub const ECG: [u8; 231] = [
    76, 77, 78, 77, 79, 86, 81, 76, 84, 93, 85, 80, 89, 95, 89, 85, 93, 98, 94,
    88, 98, 105, 96, 91, 99, 105, 101, 96, 102, 106, 101, 96, 100, 107, 101,
    94, 100, 104, 100, 91, 99, 103, 98, 91, 96, 105, 95, 88, 95, 100, 94, 85,
    93, 99, 92, 84, 91, 96, 87, 80, 83, 92, 86, 78, 84, 89, 79, 73, 81, 83, 78,
    70, 80, 82, 79, 69, 80, 82, 81, 70, 75, 81, 77, 74, 79, 83, 82, 72, 80, 87,
    79, 76, 85, 95, 87, 81, 88, 93, 88, 84, 87, 94, 86, 82, 85, 94, 85, 82, 85,
    95, 86, 83, 92, 99, 91, 88, 94, 98, 95, 90, 97, 105, 104, 94, 98, 114, 117,
    124, 144, 180, 210, 236, 253, 227, 171, 99, 49, 34, 29, 43, 69, 89, 89, 90,
    98, 107, 104, 98, 104, 110, 102, 98, 103, 111, 101, 94, 103, 108, 102, 95,
    97, 106, 100, 92, 101, 103, 100, 94, 98, 103, 96, 90, 98, 103, 97, 90, 99,
    104, 95, 90, 99, 104, 100, 93, 100, 106, 101, 93, 101, 105, 103, 96, 105,
    112, 105, 99, 103, 108, 99, 96, 102, 106, 99, 90, 92, 100, 87, 80, 82, 88,
    77, 69, 75, 79, 74, 67, 71, 78, 72, 67, 73, 81, 77, 71, 75, 84, 79, 77, 77,
    76, 76,
];

pub struct Playback<'a, O> {
    output: O,
    samples: &'a [u8],
    index: usize,
    state: &'a SharedState,
}

impl<'a, O: AnalogOutput> Playback<'a, O> {
    pub fn new(output: O, samples: &'a [u8], state: &'a SharedState) -> Self {
        Self {
            output,
            samples,
            index: 0,
            state,
        }
    }

    /// Index of the next sample to be written.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Writes the next sample and advances, wrapping at the end of the
    /// trace. An empty trace writes nothing.
    pub fn step(&mut self) {
        let Some(&level) = self.samples.get(self.index) else {
            return;
        };
        self.output.write(level);
        self.index += 1;
        if self.index == self.samples.len() {
            self.index = 0;
        }
    }

    pub async fn run(mut self) -> ! {
        loop {
            self.step();
            let period = Duration::from_micros(u64::from(self.state.period_us()));
            Timer::after(period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtremaPolicy, ECG_PLAYBACK, ECG_SWITCHES};
    use crate::mode::{Button, ModeController};
    use embassy_futures::select::{select, Either};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Clone, Default)]
    struct Dac(Rc<RefCell<Vec<u8>>>);

    impl AnalogOutput for Dac {
        fn write(&mut self, level: u8) {
            self.0.borrow_mut().push(level);
        }
    }

    #[test]
    fn trace_has_one_beat() {
        assert_eq!(ECG.len(), 231);
        assert_eq!(ECG.iter().copied().max(), Some(253));
        assert_eq!(ECG[0], 76);
        assert_eq!(ECG[230], 76);
    }

    #[test]
    fn steps_wrap_around() {
        let state = SharedState::new(4000);
        let dac = Dac::default();
        let mut playback = Playback::new(dac.clone(), &[1, 2, 3], &state);
        for _ in 0..7 {
            playback.step();
        }
        assert_eq!(*dac.0.borrow(), [1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(playback.position(), 1);
    }

    #[test]
    fn empty_trace_writes_nothing() {
        let state = SharedState::new(4000);
        let dac = Dac::default();
        let mut playback = Playback::new(dac.clone(), &[], &state);
        playback.step();
        assert!(dac.0.borrow().is_empty());
    }

    #[test]
    fn period_is_read_each_sample() {
        let state = SharedState::new(1000);
        let dac = Dac::default();
        let playback = Playback::new(dac.clone(), &ECG, &state);
        // A long period stops playback after the first sample.
        state.set_period_us(1_000_000);
        let outcome = embassy_futures::block_on(select(
            playback.run(),
            Timer::after(Duration::from_millis(20)),
        ));
        assert!(matches!(outcome, Either::Second(())));
        assert_eq!(*dac.0.borrow(), [76]);
    }

    #[test]
    fn switches_step_the_period_within_limits() {
        let state = SharedState::new(ECG_PLAYBACK.default_us);
        let mode = ModeController::new(&state, ECG_PLAYBACK, ExtremaPolicy::default())
            .with_buttons(ECG_SWITCHES);
        mode.press(Button::A);
        assert_eq!(state.period_us(), 5000);
        for _ in 0..10 {
            mode.press(Button::B);
        }
        assert_eq!(state.period_us(), ECG_PLAYBACK.min_us);
        // Keypad steps stay at 100 us.
        mode.key(b'T').unwrap();
        assert_eq!(state.period_us(), 1100);
        mode.key(b'R').unwrap();
        assert_eq!(state.period_us(), 4000);
    }

    #[test]
    fn shorter_period_plays_faster() {
        let state = SharedState::new(ECG_PLAYBACK.default_us);
        let mode = ModeController::new(&state, ECG_PLAYBACK, ExtremaPolicy::default())
            .with_buttons(ECG_SWITCHES);
        for _ in 0..3 {
            mode.press(Button::B);
        }
        assert_eq!(state.period_us(), 1000);
        let dac = Dac::default();
        let playback = Playback::new(dac.clone(), &ECG, &state);
        embassy_futures::block_on(select(
            playback.run(),
            Timer::after(Duration::from_millis(30)),
        ));
        // At 1 ms per sample a 30 ms window plays well over the 8 samples
        // the 4 ms default would allow.
        let played = dac.0.borrow().len();
        assert!(played > 8, "played {}", played);
        assert_eq!(dac.0.borrow()[..3], ECG[..3]);
    }
}
