//! Frame source abstraction used by the frame loop.

use std::sync::Arc;

use super::types::{CameraError, Frame};

/// A live stream of frames.
pub trait FrameSource {
    /// Latest decoded frame, or `None` until the first frame is decodable.
    fn latest_frame(&self) -> Option<Arc<Frame>>;

    /// Release the underlying stream. Called once when the loop stops.
    fn stop(&mut self) {}
}

/// Requests access to a live stream.
///
/// Opening is where the platform permission prompt happens; a refusal
/// comes back as [`CameraError::PermissionDenied`].
pub trait StreamOpener {
    fn open(&mut self) -> Result<Box<dyn FrameSource>, CameraError>;
}
