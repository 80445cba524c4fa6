//! Frame loop: host frame clock and the scene scheduler.

pub mod clock;
pub mod scheduler;

pub use clock::{FrameClock, FrameRequestId, ManualFrameClock};
pub use scheduler::{AnimationScheduler, SchedulerState};
