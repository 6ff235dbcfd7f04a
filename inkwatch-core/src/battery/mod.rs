//! Battery level and discharge estimation

pub mod estimator;
pub mod log;

pub use estimator::{BatteryEstimator, LogBlock, LOG_BLOCK_SAMPLES};
pub use log::{BlockRing, BlockSlot, LOG_RETENTION, LOG_SLOTS};
