//! Application events and screen navigation
//!
//! Events are produced by button tasks and the companion-app link and
//! consumed by the dispatcher. Screen changes are an explicit, finite
//! transition table.

pub mod events;
pub mod screen;

pub use events::{Button, Event};
pub use screen::{Nav, Screen};
