//! # Knob Input Module
//!
//! Potentiometer on the edge connector, read through the nRF52's SAADC and
//! reported in millivolts.
use crate::*;

/// Type alias for a single-channel SAADC configuration.
pub type Adc = saadc::Saadc<'static, 1>;

/// Top of the 14-bit conversion range.
const FULL_SCALE: i16 = 0x3fff;
/// Input voltage at full scale: 0.6 V internal reference at 1/6 gain.
const FULL_SCALE_MV: u32 = 3600;

pub struct Knob(Adc);

impl Knob {
    /// Creates the knob and calibrates the ADC.
    ///
    /// ```text
    /// let adc = saadc::Saadc::new(board.saadc, Irqs, config, [channel]);
    /// let knob = Knob::new(adc).await;
    /// ```
    pub async fn new(adc: Adc) -> Self {
        adc.calibrate().await;
        Self(adc)
    }
}

impl Sensor for Knob {
    /// Samples the wiper voltage in mV. Slightly negative conversions near
    /// ground read as 0.
    async fn read(&mut self) -> Sample {
        let mut buf = [0];
        self.0.sample(&mut buf).await;
        let raw = buf[0].clamp(0, FULL_SCALE) as u32;
        raw * FULL_SCALE_MV / (FULL_SCALE as u32 + 1)
    }
}
