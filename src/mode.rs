//! # Mode Controller
//!
//! Maps asynchronous user input onto the shared mode flags. Two sources
//! feed it independently of the sampling cadence:
//!
//! - **Buttons**, polled on a fixed period. A pressed button is acted on
//!   as-is every poll; the poll period is the only debounce.
//! - **Keypad bytes** from the serial terminal, one command per byte.
//!
//! ## Default keymap
//!
//! | key | command                          |
//! |:---:|:---------------------------------|
//! | `O` | toggle measurement on/off        |
//! | `H` | toggle hold                      |
//! | `I` | toggle display unit              |
//! | `M` | report the maximum so far        |
//! | `T` | lengthen the period by 100 us    |
//! | `B` | shorten the period by 100 us     |
//! | `R` | restore the default period       |
use rtt_target::rprintln;

use crate::config::{ExtremaPolicy, PeriodControl};
use crate::error::CommandError;
use crate::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    ToggleEnable,
    ToggleHold,
    ToggleUnit,
    ReportMax,
    /// Signed change of the period in microseconds.
    AdjustPeriod(i32),
    ResetPeriod,
}

/// Follow-up work a command asks of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Emit the maximum so far, out of band.
    ReportMax,
}

/// Physical momentary inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    C,
}

pub const DEFAULT_KEYMAP: &[(u8, Command)] = &[
    (b'O', Command::ToggleEnable),
    (b'H', Command::ToggleHold),
    (b'I', Command::ToggleUnit),
    (b'M', Command::ReportMax),
    (b'T', Command::AdjustPeriod(100)),
    (b'B', Command::AdjustPeriod(-100)),
    (b'R', Command::ResetPeriod),
];

/// Button one starts measuring, button two stops it.
pub const ENABLE_DISABLE: &[(Button, Command)] =
    &[(Button::A, Command::Enable), (Button::B, Command::Disable)];

/// Button one toggles measuring, button two toggles hold.
pub const TOGGLE_ENABLE_HOLD: &[(Button, Command)] =
    &[(Button::A, Command::ToggleEnable), (Button::B, Command::ToggleHold)];

pub struct ModeController<'a> {
    state: &'a SharedState,
    keymap: &'a [(u8, Command)],
    buttons: &'a [(Button, Command)],
    period: PeriodControl,
    extrema: ExtremaPolicy,
}

impl<'a> ModeController<'a> {
    pub fn new(state: &'a SharedState, period: PeriodControl, extrema: ExtremaPolicy) -> Self {
        Self {
            state,
            keymap: DEFAULT_KEYMAP,
            buttons: ENABLE_DISABLE,
            period,
            extrema,
        }
    }

    pub fn with_keymap(mut self, keymap: &'a [(u8, Command)]) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn with_buttons(mut self, buttons: &'a [(Button, Command)]) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn parse(&self, key: u8) -> Result<Command, CommandError> {
        self.keymap
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, command)| command)
            .ok_or(CommandError::InvalidKey(key))
    }

    /// Handles one keypad byte.
    pub fn key(&self, key: u8) -> Result<Option<Request>, CommandError> {
        let command = self.parse(key)?;
        Ok(self.apply(command))
    }

    /// Handles one poll of a pressed button. Unmapped buttons do nothing.
    pub fn press(&self, button: Button) -> Option<Request> {
        let command = self.buttons.iter().find(|(b, _)| *b == button)?.1;
        self.apply(command)
    }

    pub fn apply(&self, command: Command) -> Option<Request> {
        match command {
            Command::Enable => self.set_enabled(true),
            Command::Disable => self.set_enabled(false),
            Command::ToggleEnable => {
                let enabled = self.state.toggle_enabled();
                self.switched(enabled);
            }
            Command::ToggleHold => {
                let hold = self.state.toggle_hold();
                rprintln!("hold: {}", hold);
            }
            Command::ToggleUnit => {
                let alternate = self.state.toggle_unit();
                rprintln!("alternate unit: {}", alternate);
            }
            Command::ReportMax => return Some(Request::ReportMax),
            Command::AdjustPeriod(delta) => {
                let period = self
                    .state
                    .adjust_period_us(delta, self.period.min_us, self.period.max_us);
                rprintln!("period: {} us", period);
            }
            Command::ResetPeriod => {
                self.state.set_period_us(self.period.default_us);
                rprintln!("period: {} us", self.period.default_us);
            }
        }
        None
    }

    fn set_enabled(&self, enabled: bool) {
        if self.state.set_enabled(enabled) != enabled {
            self.switched(enabled);
        }
    }

    fn switched(&self, enabled: bool) {
        if enabled && self.extrema.reset_on_enable {
            self.state.reset_extrema();
        }
        rprintln!("measurement {}", if enabled { "enabled" } else { "disabled" });
    }
}
