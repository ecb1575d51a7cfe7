//! # BCD Display Module
//!
//! Drives a multiplexed 7-segment display through an external BCD decoder:
//! four shared data lines carry one digit in BCD, and each digit has its
//! own select line that latches the data on a high pulse.
//!
//! ```text
//!   857 -> [7, 5, 8]          least significant digit first
//!   digit 0: data = 0b0111, pulse select 0
//!   digit 1: data = 0b0101, pulse select 1
//!   digit 2: data = 0b1000, pulse select 2
//! ```
use crate::error::ConfigurationError;
use crate::output::Switch;
use crate::report::{Report, Sink};

/// Writes the lowest `digits` decimal digits of `value` into `out`, least
/// significant first. Higher digits of `value` are dropped.
pub fn to_bcd(value: u32, digits: usize, out: &mut [u8]) -> Result<(), ConfigurationError> {
    if digits > out.len() {
        return Err(ConfigurationError::DigitCount {
            requested: digits,
            capacity: out.len(),
        });
    }
    let mut rest = value;
    for digit in out.iter_mut().take(digits) {
        *digit = (rest % 10) as u8;
        rest /= 10;
    }
    Ok(())
}

/// Display with `D` digits.
pub struct BcdDisplay<S, const D: usize> {
    data: [S; 4],
    select: [S; D],
}

impl<S: Switch, const D: usize> BcdDisplay<S, D> {
    pub fn new(data: [S; 4], select: [S; D]) -> Self {
        let mut display = Self { data, select };
        display.off();
        display
    }

    fn latch(&mut self, position: usize, bcd: u8) {
        self.select[position].set(false);
        for (bit, line) in self.data.iter_mut().enumerate() {
            line.set((bcd >> bit) & 1 != 0);
        }
        self.select[position].set(true);
        self.select[position].set(false);
    }

    /// Shows the lowest `digits` digits of `value`. Asking for more digits
    /// than the display has is a configuration error and leaves the display
    /// untouched.
    pub fn write(&mut self, value: u32, digits: usize) -> Result<(), ConfigurationError> {
        let mut bcd = [0u8; D];
        to_bcd(value, digits, &mut bcd)?;
        for (position, &digit) in bcd.iter().enumerate().take(digits) {
            self.latch(position, digit);
        }
        Ok(())
    }

    /// Blanks the display by driving every line low.
    pub fn off(&mut self) {
        for line in self.data.iter_mut().chain(self.select.iter_mut()) {
            line.set(false);
        }
    }
}

impl<S: Switch, const D: usize> Sink for BcdDisplay<S, D> {
    fn emit(&mut self, report: &Report) {
        match *report {
            Report::Disabled => self.off(),
            Report::Live { value, .. } => {
                // D digits always fit.
                let _ = self.write(u32::try_from(value).unwrap_or(0), D);
            }
            Report::Max { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::Line;
    use std::vec::Vec;

    fn display() -> ([Line; 4], [Line; 3], BcdDisplay<Line, 3>) {
        let data: [Line; 4] = Default::default();
        let select: [Line; 3] = Default::default();
        let display = BcdDisplay::new(data.clone(), select.clone());
        for line in data.iter().chain(select.iter()) {
            line.0.borrow_mut().clear();
        }
        (data, select, display)
    }

    #[test]
    fn splits_least_significant_first() {
        let mut digits = [0u8; 3];
        to_bcd(857, 3, &mut digits).unwrap();
        assert_eq!(digits, [7, 5, 8]);
    }

    #[test]
    fn drops_digits_that_do_not_fit() {
        let mut digits = [0u8; 3];
        to_bcd(1234, 3, &mut digits).unwrap();
        assert_eq!(digits, [4, 3, 2]);
    }

    #[test]
    fn rejects_more_digits_than_capacity() {
        let mut digits = [9u8; 3];
        assert_eq!(
            to_bcd(857, 4, &mut digits),
            Err(ConfigurationError::DigitCount {
                requested: 4,
                capacity: 3
            })
        );
        assert_eq!(digits, [9, 9, 9]);
    }

    #[test]
    fn latches_each_digit_with_a_select_pulse() {
        let (data, select, mut display) = display();
        display.write(857, 3).unwrap();
        for line in select.iter() {
            assert_eq!(line.writes(), [false, true, false]);
        }
        // Data lines end holding the last digit, 8 = 0b1000.
        let last: Vec<bool> = data.iter().map(Line::level).collect();
        assert_eq!(last, [false, false, false, true]);
        // Bit 0 carried 7, 5, 8.
        assert_eq!(data[0].writes(), [true, true, false]);
    }

    #[test]
    fn bad_digit_count_leaves_lines_alone() {
        let (data, select, mut display) = display();
        assert!(display.write(1, 4).is_err());
        assert!(data.iter().chain(select.iter()).all(|l| l.writes().is_empty()));
    }

    #[test]
    fn disabled_report_blanks_display() {
        let (data, select, mut display) = display();
        display.emit(&Report::Live {
            value: 42,
            extrema: None,
            unit: "cm",
        });
        display.emit(&Report::Disabled);
        assert!(data.iter().chain(select.iter()).all(|l| !l.level()));
    }
}
