//! Battery ADC channel
//!
//! On the Pico family boards VSYS is routed through a 1:3 divider to
//! GPIO29 (ADC3).

use embassy_rp::adc::{Adc, Async, Channel};

use inkwatch_hal::adc::{AdcError, BatteryAdc};

/// GPIO carrying the VSYS/3 divider output
pub const VSYS_ADC_GPIO: u8 = 29;

/// Battery sense channel on the shared ADC
pub struct VsysAdc<'d> {
    adc: Adc<'d, Async>,
    channel: Channel<'d>,
}

impl<'d> VsysAdc<'d> {
    pub fn new(adc: Adc<'d, Async>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }
}

impl<'d> BatteryAdc for VsysAdc<'d> {
    async fn read_raw(&mut self) -> Result<u16, AdcError> {
        self.adc
            .read(&mut self.channel)
            .await
            .map_err(|_| AdcError::Conversion)
    }
}
