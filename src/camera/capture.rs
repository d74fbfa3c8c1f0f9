//! Camera capture handle and public API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::capture_loop::{run_capture_loop, FrameSlot};
use super::device::list_devices;
use super::source::{FrameSource, StreamOpener};
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Camera capture handle.
///
/// The camera is driven by a background thread that keeps the most recent
/// decoded frame in a shared slot. Call `start()` to begin capturing and
/// `latest_frame()` to read the slot.
pub struct CameraCapture {
    frame_slot: FrameSlot,
    capture_thread: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    settings: CameraSettings,
    /// Set once the stream is open
    actual_resolution: Option<Resolution>,
    actual_fps: Option<u32>,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Validate the device index and prepare a capture handle.
    ///
    /// The camera itself is opened inside the capture thread by `start()`.
    ///
    /// # Errors
    /// * `CameraError::NoDevices` - If no camera is attached
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        Ok(Self {
            frame_slot: Arc::new(Mutex::new(None)),
            capture_thread: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
            actual_resolution: None,
            actual_fps: None,
        })
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Resolution negotiated with the camera, once started.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    pub fn actual_fps(&self) -> Option<u32> {
        self.actual_fps
    }

    /// Start capturing frames in a background thread.
    ///
    /// Blocks until the thread reports that the stream is open (or failed).
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If capture is already running
    /// * `CameraError::PermissionDenied` - If camera access is refused
    /// * `CameraError::OpenFailed` / `StreamFailed` - Other backend failures
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);

        let slot = Arc::clone(&self.frame_slot);
        let stop = Arc::clone(&self.stop_signal);
        let settings = self.settings.clone();
        let (info_tx, info_rx) = mpsc::channel::<Result<(Resolution, u32), CameraError>>();

        let handle = std::thread::spawn(move || {
            run_capture_loop(settings, slot, stop, info_tx);
        });
        self.capture_thread = Some(handle);

        match info_rx.recv() {
            Ok(Ok((res, fps))) => {
                self.actual_resolution = Some(res);
                self.actual_fps = Some(fps);
                Ok(())
            }
            Ok(Err(e)) => {
                self.join_thread();
                Err(e)
            }
            Err(_) => {
                self.join_thread();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Signal the capture thread to stop and wait for it.
    pub fn stop(&mut self) {
        self.join_thread();
        if let Ok(mut slot) = self.frame_slot.lock() {
            *slot = None;
        }
    }

    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn join_thread(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSource for CameraCapture {
    fn latest_frame(&self) -> Option<Arc<Frame>> {
        let slot = self.frame_slot.lock().ok()?;
        slot.clone()
    }

    fn stop(&mut self) {
        CameraCapture::stop(self);
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.join_thread();
    }
}

/// Opens the configured webcam each time the frame loop asks for a stream.
#[derive(Debug, Clone)]
pub struct CameraOpener {
    settings: CameraSettings,
}

impl CameraOpener {
    pub fn new(settings: CameraSettings) -> Self {
        Self { settings }
    }
}

impl StreamOpener for CameraOpener {
    fn open(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        let mut camera = CameraCapture::open(self.settings.clone())?;
        camera.start()?;
        Ok(Box::new(camera))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_open_invalid_device() {
        let settings = CameraSettings {
            device_index: 999,
            ..CameraSettings::default()
        };
        match CameraCapture::open(settings) {
            Err(CameraError::DeviceNotFound(idx)) => assert_eq!(idx, 999),
            // Machines without any camera or camera backend
            Err(CameraError::NoDevices) | Err(CameraError::Unsupported(_)) => {}
            other => panic!("Expected DeviceNotFound, got {:?}", other),
        }
    }
}
