//! Background capture thread implementation.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Latest decoded frame, shared between the capture thread and readers.
pub type FrameSlot = Arc<Mutex<Option<Arc<Frame>>>>;

/// Run the capture loop in a background thread.
///
/// Reports the negotiated resolution (or the open error) on `info_tx`
/// before entering the loop.
pub fn run_capture_loop(
    settings: CameraSettings,
    slot: FrameSlot,
    stop: Arc<AtomicBool>,
    info_tx: Sender<Result<(Resolution, u32), CameraError>>,
) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(classify_open_error(&e.to_string(), |m| {
            CameraError::StreamFailed(m)
        })));
        return;
    }

    let res = camera.resolution();
    let actual_res = Resolution {
        width: res.width(),
        height: res.height(),
    };
    let _ = info_tx.send(Ok((actual_res, camera.frame_rate())));
    log::info!(
        "Camera {} streaming at {}x{}",
        settings.device_index,
        actual_res.width,
        actual_res.height
    );

    let stream_start = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        if let Ok(raw_frame) = camera.frame() {
            let timestamp_ms = stream_start.elapsed().as_secs_f64() * 1000.0;
            // Undecodable buffers are skipped; the next one usually works.
            if let Some(mut frame) = convert_to_rgb(&raw_frame, timestamp_ms) {
                if settings.mirror {
                    mirror_horizontal(&mut frame);
                }
                if let Ok(mut latest) = slot.lock() {
                    *latest = Some(Arc::new(frame));
                }
            }
        }

        thread::sleep(Duration::from_millis(1));
    }

    let _ = camera.stop_stream();
    log::info!("Camera {} stream stopped", settings.device_index);
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    // NV12 (native on macOS), then MJPEG, then whatever the camera offers.
    let requested_resolution =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = String::from("no capture format accepted");

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format attempt failed: {}", e);
                last_error = e.to_string();
            }
        }
    }

    Err(classify_open_error(&last_error, CameraError::OpenFailed))
}

/// Map a backend error message onto the permission/unsupported taxonomy.
pub(crate) fn classify_open_error(
    message: &str,
    fallback: impl FnOnce(String) -> CameraError,
) -> CameraError {
    let msg = message.to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        CameraError::PermissionDenied
    } else if msg.contains("not supported") || msg.contains("unsupported") {
        CameraError::Unsupported(message.to_string())
    } else {
        fallback(message.to_string())
    }
}
