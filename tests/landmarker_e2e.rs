//! Drives the real landmarker process bridge with a scripted `sh` stand-in.
#![cfg(unix)]

use std::sync::Arc;

use hand_pose_recorder::camera::{CameraError, Frame, FrameSource, StreamOpener};
use hand_pose_recorder::detector::{DetectorConfig, HandDetector, Readiness, RunningMode};
use hand_pose_recorder::frame_loop::TickOutcome;
use hand_pose_recorder::recorder::CapturePolicy;
use hand_pose_recorder::render::AsciiCanvas;
use hand_pose_recorder::session::Session;
use tempfile::TempDir;

struct OneFrame;

impl StreamOpener for OneFrame {
    fn open(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        Ok(Box::new(OneFrame))
    }
}

impl FrameSource for OneFrame {
    fn latest_frame(&self) -> Option<Arc<Frame>> {
        Some(Arc::new(Frame::blank(1, 1, 40.0)))
    }
}

fn hand_json() -> String {
    let points: Vec<String> = (0..21)
        .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f32 / 20.0))
        .collect();
    format!(r#"{{"landmarks":[[{}]]}}"#, points.join(","))
}

fn shell_config(script: String) -> DetectorConfig {
    DetectorConfig {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), script, "landmarker".to_string()],
        ..DetectorConfig::default()
    }
}

#[test]
fn test_process_landmarker_feeds_recorder() {
    // handshake, set_mode reply, one detect reply
    let script = format!(
        "echo '{{\"ready\":true}}'\nread req; echo '{{}}'\nread req; echo '{}'\ncat > /dev/null",
        hand_json()
    );
    let detector = HandDetector::initialize(&shell_config(script));
    assert_eq!(*detector.readiness(), Readiness::Ready);

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(
        Box::new(OneFrame),
        CapturePolicy::default(),
        AsciiCanvas::new(20, 10),
        dir.path(),
    );
    session.attach_detector(detector);
    session.toggle_camera();

    assert_eq!(session.refresh(), TickOutcome::Rendered { detected: true });
    assert_eq!(session.detector().running_mode(), RunningMode::Video);
    assert_eq!(session.capture_pose(), Ok(1));
    assert_eq!(session.poses().as_slice()[0].vector[3], 0.05);

    // Same frame again: rendered from the stored result, no new request
    assert_eq!(session.refresh(), TickOutcome::Rendered { detected: false });
}

#[test]
fn test_failed_landmarker_leaves_session_inert() {
    let detector = HandDetector::initialize(&shell_config(
        r#"echo '{"ready":false,"error":"model download failed"}'"#.to_string(),
    ));

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(
        Box::new(OneFrame),
        CapturePolicy::default(),
        AsciiCanvas::new(20, 10),
        dir.path(),
    );
    session.attach_detector(detector);

    assert!(!session.detector().is_ready());
    session.toggle_camera();
    assert_eq!(session.refresh(), TickOutcome::Inactive);
    assert!(session
        .status()
        .error
        .as_deref()
        .unwrap()
        .contains("model download failed"));
}
