//! Camera capture module for webcam access and frame capture.
//!
//! - Device enumeration via [`list_devices`]
//! - Live capture via [`CameraCapture`], opened on demand by [`CameraOpener`]
//! - The [`FrameSource`] / [`StreamOpener`] seams the frame loop runs against

mod capture;
mod capture_loop;
mod device;
mod frame_utils;
mod source;
mod types;

pub use capture::{CameraCapture, CameraOpener};
pub use device::list_devices;
pub use source::{FrameSource, StreamOpener};
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, Resolution};
