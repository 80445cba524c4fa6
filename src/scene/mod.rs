//! The contract every animated scene fulfils.
//!
//! A scene is built once at activation, then advanced and drawn once per
//! host frame by [`crate::animation::AnimationScheduler`]. State mutation and
//! drawing for a frame happen back to back inside one callback, so
//! observers never see a half-updated frame.

use crate::surface::{Surface, SurfaceSize};

/// A self-contained animation: generate once, advance every frame, draw.
pub trait Scene {
    /// Advance all time-varying state by one frame. `timestamp_ms` is the
    /// host's monotonic frame timestamp.
    fn advance(&mut self, timestamp_ms: f64);

    /// Paint the current state. Implementations clear the surface first.
    fn draw(&self, surface: &mut dyn Surface);

    /// React to a host resize notification. Most scenes are laid out for a
    /// fixed canvas and ignore it.
    fn resize(&mut self, _size: SurfaceSize) {}
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn advance(&mut self, timestamp_ms: f64) {
        (**self).advance(timestamp_ms);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        (**self).draw(surface);
    }

    fn resize(&mut self, size: SurfaceSize) {
        (**self).resize(size);
    }
}
