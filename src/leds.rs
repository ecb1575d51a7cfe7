//! GPIO outputs and RTT channels seen through the library's traits.
use crate::*;

/// Push-pull output line, low at reset.
pub struct Led(Output<'static, AnyPin>);

impl Led {
    pub fn new(pin: AnyPin) -> Self {
        Self(Output::new(pin, Level::Low, OutputDrive::Standard))
    }
}

impl Switch for Led {
    fn set(&mut self, on: bool) {
        if on {
            self.0.set_high();
        } else {
            self.0.set_low();
        }
    }
}

/// The RTT print channel, as set by `set_print_channel`.
pub struct Terminal;

impl Transport for Terminal {
    fn send(&mut self, text: &str) {
        rprint!("{}", text);
    }
}

/// Raw RTT up channel for telemetry frames. Frames are dropped when the
/// host is not draining the buffer.
pub struct TelemetryChannel(pub UpChannel);

impl Transport for TelemetryChannel {
    fn send(&mut self, text: &str) {
        self.0.write(text.as_bytes());
    }
}
