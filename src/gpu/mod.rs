//! GPU presentation for the native viewer.
//!
//! Scenes rasterize on the CPU; this module owns the wgpu device and
//! surface and blits each finished frame to the window.

/// Full-screen pass drawing the scene texture to the swapchain.
pub mod present;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Per-frame scene texture uploads.
pub mod texture;
