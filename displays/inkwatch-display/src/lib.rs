//! E-paper panel abstraction and screen rendering for Inkwatch
//!
//! This crate provides:
//! - `EpdPanel` trait for bistable panels with windowed refresh
//! - `FrameBuffer`, a 1-bit 200x200 frame in panel RAM layout
//! - Screen layout and the refresh window for each refresh tier
//! - The renderer that turns a `RedrawPlan` and a `View` into pixels
//!
//! # Architecture
//!
//! Rendering only needs an `embedded-graphics` `DrawTarget`, so screens can
//! be drawn and inspected on the host. The firmware owns the panel driver,
//! draws into it, then refreshes the window returned by [`render`].

#![no_std]
#![deny(unsafe_code)]

pub mod digits;
pub mod framebuffer;
pub mod layout;
pub mod panel;
pub mod render;

pub use framebuffer::FrameBuffer;
pub use layout::{refresh_window, HEIGHT, WIDTH};
pub use panel::{EpdPanel, PanelError};
pub use render::{render, View};
