//! Display state machine
//!
//! Tracks the active screen and what the panel currently shows, and turns
//! that into the smallest refresh that is visually correct.

pub mod refresh;
pub mod retained;

pub use refresh::{DisplayState, FrameInputs, RedrawPlan, RefreshTier};
pub use retained::{RetainedState, RETAINED_MAGIC};
