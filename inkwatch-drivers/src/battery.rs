//! Battery voltage monitor
//!
//! The battery is measured through a resistor divider on an ADC channel:
//!
//! ```text
//! V_bat = raw * ratio * vref_mv / 4096
//! ```

use inkwatch_hal::adc::{AdcError, BatteryAdc};

/// Full scale of a 12-bit conversion
const ADC_FULL_SCALE: u32 = 4096;

/// Divider between the battery and the ADC pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageDivider {
    /// Battery voltage over pin voltage
    pub ratio: u16,
    /// ADC reference voltage in mV
    pub vref_mv: u16,
}

impl VoltageDivider {
    /// VSYS/3 divider with a 3.3 V reference (Pico boards)
    pub const VSYS: Self = Self {
        ratio: 3,
        vref_mv: 3300,
    };

    /// Convert a raw 12-bit reading to battery millivolts
    pub fn to_millivolts(&self, raw: u16) -> u16 {
        let mv = u32::from(raw) * u32::from(self.ratio) * u32::from(self.vref_mv) / ADC_FULL_SCALE;
        mv.min(u32::from(u16::MAX)) as u16
    }
}

/// Battery voltage source
pub struct BatteryMonitor<A> {
    adc: A,
    divider: VoltageDivider,
}

impl<A: BatteryAdc> BatteryMonitor<A> {
    pub fn new(adc: A, divider: VoltageDivider) -> Self {
        Self { adc, divider }
    }

    /// Read the battery voltage in millivolts
    pub async fn read_millivolts(&mut self) -> Result<u16, AdcError> {
        let raw = self.adc.read_raw().await?;
        Ok(self.divider.to_millivolts(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    /// Returns a fixed reading, or fails
    struct FixedAdc(Option<u16>);

    impl BatteryAdc for FixedAdc {
        async fn read_raw(&mut self) -> Result<u16, AdcError> {
            self.0.ok_or(AdcError::Conversion)
        }
    }

    #[test]
    fn test_vsys_conversion() {
        let div = VoltageDivider::VSYS;
        assert_eq!(div.to_millivolts(0), 0);
        // 4096 * 4000 / 9900
        assert_eq!(div.to_millivolts(1655), 4000);
        assert_eq!(div.to_millivolts(4095), 9897);
    }

    #[test]
    fn test_two_to_one_divider() {
        let div = VoltageDivider {
            ratio: 2,
            vref_mv: 2450,
        };
        assert_eq!(div.to_millivolts(3430), 4103);
    }

    #[test]
    fn test_monitor_reads_millivolts() {
        let mut monitor = BatteryMonitor::new(FixedAdc(Some(1655)), VoltageDivider::VSYS);
        assert_eq!(block_on(monitor.read_millivolts()), Ok(4000));
    }

    #[test]
    fn test_monitor_propagates_adc_error() {
        let mut monitor = BatteryMonitor::new(FixedAdc(None), VoltageDivider::VSYS);
        assert_eq!(
            block_on(monitor.read_millivolts()),
            Err(AdcError::Conversion)
        );
    }
}
