//! Battery voltage sampling

/// ADC read failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Conversion did not complete
    Conversion,
}

/// ADC channel wired to the battery divider
pub trait BatteryAdc {
    /// Read one raw 12-bit conversion (0-4095)
    fn read_raw(&mut self) -> impl core::future::Future<Output = Result<u16, AdcError>>;
}
