//! # User Interface Module
//!
//! Polls the two board buttons and the RTT keypad channel and hands what it
//! finds to the [`ModeController`].
//!
//! ## Control Scheme
//!
//! - **Button A**: start measuring
//! - **Button B**: stop measuring
//! - **Keypad**: the default keymap, see [`meter::mode`]
use crate::*;

/// Bytes read from the keypad per poll.
const KEYPAD_CHUNK: usize = 16;

pub struct Ui<'a> {
    mode: ModeController<'a>,
    button_a: Button,
    button_b: Button,
    keypad: DownChannel,
    terminal: SerialText<Terminal>,
    state: &'a SharedState,
    units: Units,
    poll: Duration,
}

impl<'a> Ui<'a> {
    pub fn new(
        mode: ModeController<'a>,
        buttons: (Button, Button),
        keypad: DownChannel,
        state: &'a SharedState,
        config: &MeterConfig,
    ) -> Self {
        Self {
            mode,
            button_a: buttons.0,
            button_b: buttons.1,
            keypad,
            terminal: config.serial(Terminal),
            state,
            units: config.units,
            poll: config.poll_period,
        }
    }

    fn request(&mut self, request: Option<Request>) {
        if let Some(Request::ReportMax) = request {
            match Report::max(self.state, &self.units) {
                Some(report) => self.terminal.emit(&report),
                None => rprintln!("no measurement yet"),
            }
        }
    }

    fn poll_buttons(&mut self) {
        // Buttons are active low.
        if self.button_a.is_low() {
            let request = self.mode.press(mode::Button::A);
            self.request(request);
        }
        if self.button_b.is_low() {
            let request = self.mode.press(mode::Button::B);
            self.request(request);
        }
    }

    fn poll_keypad(&mut self) {
        let mut keys = [0u8; KEYPAD_CHUNK];
        let count = self.keypad.read(&mut keys);
        for &key in &keys[..count] {
            // Line endings from the host terminal.
            if key == b'\r' || key == b'\n' {
                continue;
            }
            match self.mode.key(key) {
                Ok(request) => self.request(request),
                Err(err) => rprintln!("{}", err),
            }
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.poll_buttons();
            self.poll_keypad();
            Timer::after(self.poll).await;
        }
    }
}
