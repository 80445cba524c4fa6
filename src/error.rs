//! Crate-level error types.

use std::fmt;

#[cfg(feature = "viewer")]
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the fraudviz crate.
#[derive(Debug)]
pub enum VizError {
    /// A scene was activated before a drawable surface existed.
    SurfaceUnavailable,
    /// The host frame clock refused to schedule a frame callback.
    FrameRequest(String),
    /// GPU context initialization failure.
    #[cfg(feature = "viewer")]
    Gpu(RenderContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
    /// Browser API failure (canvas context, animation frame, listeners).
    Web(String),
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceUnavailable => {
                write!(f, "no drawable surface available for scene activation")
            }
            Self::FrameRequest(msg) => {
                write!(f, "frame request refused: {msg}")
            }
            #[cfg(feature = "viewer")]
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
            Self::Web(msg) => write!(f, "web error: {msg}"),
        }
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "viewer")]
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "viewer")]
impl From<RenderContextError> for VizError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for VizError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure() {
        let msg = VizError::SurfaceUnavailable.to_string();
        assert!(msg.contains("surface"));
        let msg = VizError::OptionsParse("bad key".to_owned()).to_string();
        assert_eq!(msg, "options parse error: bad key");
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let err: VizError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(VizError::Web("x".to_owned()).source().is_none());
    }
}
