//! Camera types and data structures.

use std::fmt;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480, enough for the hand landmark model
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::MEDIUM
    }
}

/// A decoded RGB camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data, 3 bytes per pixel, row-major
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Presentation time in milliseconds since the stream started.
    ///
    /// Two frames with equal timestamps are the same source frame.
    pub timestamp_ms: f64,
}

impl Frame {
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Create a black frame of the given size.
    pub fn blank(width: u32, height: u32, timestamp_ms: f64) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * Self::BYTES_PER_PIXEL],
            width,
            height,
            timestamp_ms,
        }
    }
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Capture resolution
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: true,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// No cameras found on the system
    NoDevices,
    /// Camera capture is not available on this platform/backend
    Unsupported(String),
    /// Failed to open camera
    OpenFailed(String),
    /// Camera permission denied
    PermissionDenied,
    /// Camera device not found at specified index
    DeviceNotFound(u32),
    /// Failed to start video stream
    StreamFailed(String),
    /// Capture thread is already running
    AlreadyRunning,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoDevices => write!(f, "No cameras found"),
            CameraError::Unsupported(msg) => {
                write!(f, "Camera capture is not supported here: {}", msg)
            }
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::PermissionDenied => {
                write!(
                    f,
                    "Camera permission denied. Grant camera access to this terminal and try again"
                )
            }
            CameraError::DeviceNotFound(index) => {
                write!(
                    f,
                    "Camera device {} not found. Run 'list-cameras' to see available devices",
                    index
                )
            }
            CameraError::StreamFailed(msg) => write!(f, "Failed to start camera stream: {}", msg),
            CameraError::AlreadyRunning => write!(f, "Capture thread is already running"),
        }
    }
}

impl std::error::Error for CameraError {}
