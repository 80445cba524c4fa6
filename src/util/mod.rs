//! Shared utilities for the scenes.
//!
//! Helpers for frame timing and palette color blending.

pub mod color;
pub mod frame_timing;
