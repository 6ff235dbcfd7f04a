//! Replies sent to the subscribed companion app
//!
//! Both reports are fixed-size notifications. The caller is responsible for
//! only sending them while a client is connected and subscribed.

use crate::header::{Catenation, Header, HEADER_LEN};

/// Reply command code: device info
pub const CMD_INFO: u8 = 0x92;
/// Reply command code: battery
pub const CMD_BATTERY: u8 = 0x91;

/// Size of [`info_report`]
pub const INFO_REPORT_LEN: usize = 20;
/// Size of [`battery_report`]
pub const BATTERY_REPORT_LEN: usize = 8;

/// Firmware version announced in the info report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

pub const FIRMWARE_VERSION: Version = Version {
    major: 1,
    minor: 6,
    patch: 0,
};

// Capability bytes the companion app expects after the version
const CAPABILITIES: [u8; 12] = [
    0x00, 0xFB, 0x1E, 0x40, 0xC0, 0x0E, 0x32, 0x28, 0x00, 0xE2, 0x00, 0x80,
];

fn header(total_len: usize) -> [u8; HEADER_LEN] {
    Header::for_payload(Catenation::A, total_len - HEADER_LEN).encode()
}

/// Device info / capability announcement
pub fn info_report() -> [u8; INFO_REPORT_LEN] {
    let mut out = [0u8; INFO_REPORT_LEN];
    out[..HEADER_LEN].copy_from_slice(&header(INFO_REPORT_LEN));
    out[4] = CMD_INFO;
    out[5] = 0xC0;
    out[6] = FIRMWARE_VERSION.major;
    out[7] = FIRMWARE_VERSION.minor * 10 + FIRMWARE_VERSION.patch;
    out[8..].copy_from_slice(&CAPABILITIES);
    out
}

/// Battery level report
pub fn battery_report(level: u8, charging: bool) -> [u8; BATTERY_REPORT_LEN] {
    let [h0, h1, h2, h3] = header(BATTERY_REPORT_LEN);
    [
        h0,
        h1,
        h2,
        h3,
        CMD_BATTERY,
        0x80,
        u8::from(charging),
        level.min(100),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_report_bytes() {
        assert_eq!(
            info_report(),
            [
                0xAB, 0x00, 0x11, 0xFF, 0x92, 0xC0, 0x01, 0x3C, 0x00, 0xFB, 0x1E, 0x40, 0xC0,
                0x0E, 0x32, 0x28, 0x00, 0xE2, 0x00, 0x80
            ]
        );
    }

    #[test]
    fn test_battery_report_bytes() {
        assert_eq!(
            battery_report(87, false),
            [0xAB, 0x00, 0x05, 0xFF, 0x91, 0x80, 0x00, 87]
        );
        assert_eq!(battery_report(150, true)[6..], [0x01, 100]);
    }
}
