//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::camera::{CameraError, Frame, FrameSource, StreamOpener};
use crate::detector::{DetectorError, LandmarkModel, RunningMode};
use crate::landmarks::{DetectionResult, Hand, Landmark, LANDMARKS_PER_HAND};
use crate::render::{DrawStyle, Surface};

/// A 21-landmark hand whose coordinates are shifted by `offset`.
pub fn full_hand(offset: f32) -> Hand {
    Hand::new(
        (0..LANDMARKS_PER_HAND)
            .map(|i| {
                let t = i as f32 / LANDMARKS_PER_HAND as f32;
                Landmark::new(t * 0.5 + offset, 0.9 - t * 0.5, -t * 0.1)
            })
            .collect(),
    )
}

#[derive(Debug, Default)]
struct ModelCalls {
    mode_switches: Vec<RunningMode>,
    detect_timestamps: Vec<f64>,
}

/// Observes what a [`ScriptedModel`] was asked to do after it was boxed.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<ModelCalls>>,
}

impl CallLog {
    pub fn detect_count(&self) -> usize {
        self.calls.lock().unwrap().detect_timestamps.len()
    }

    pub fn detect_timestamps(&self) -> Vec<f64> {
        self.calls.lock().unwrap().detect_timestamps.clone()
    }

    pub fn mode_switches(&self) -> Vec<RunningMode> {
        self.calls.lock().unwrap().mode_switches.clone()
    }
}

/// Model that replays queued results, repeating the last one when drained.
pub struct ScriptedModel {
    results: VecDeque<DetectionResult>,
    last: DetectionResult,
    calls: CallLog,
}

impl ScriptedModel {
    pub fn new(results: Vec<DetectionResult>) -> Self {
        Self {
            results: results.into(),
            last: DetectionResult::empty(),
            calls: CallLog::default(),
        }
    }

    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }
}

impl LandmarkModel for ScriptedModel {
    fn set_running_mode(&mut self, mode: RunningMode) -> Result<(), DetectorError> {
        self.calls.calls.lock().unwrap().mode_switches.push(mode);
        Ok(())
    }

    fn detect(&mut self, _frame: &Frame, timestamp_ms: f64) -> Result<DetectionResult, DetectorError> {
        self.calls
            .calls
            .lock()
            .unwrap()
            .detect_timestamps
            .push(timestamp_ms);
        if let Some(next) = self.results.pop_front() {
            self.last = next;
        }
        Ok(self.last.clone())
    }
}

/// Model whose every detection fails.
pub struct FailingModel {
    message: String,
}

impl FailingModel {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl LandmarkModel for FailingModel {
    fn set_running_mode(&mut self, _mode: RunningMode) -> Result<(), DetectorError> {
        Ok(())
    }

    fn detect(&mut self, _frame: &Frame, _timestamp_ms: f64) -> Result<DetectionResult, DetectorError> {
        Err(DetectorError::Model(self.message.clone()))
    }
}

type SharedFrame = Arc<Mutex<Option<Arc<Frame>>>>;

/// In-memory camera: tests push frames, the loop reads the latest one.
#[derive(Clone, Default)]
pub struct FakeCamera {
    frame: SharedFrame,
    deny: bool,
    opens: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    pub fn opener(&self) -> FakeOpener {
        FakeOpener {
            camera: self.clone(),
        }
    }

    pub fn push_frame(&self, width: u32, height: u32, timestamp_ms: f64) {
        *self.frame.lock().unwrap() = Some(Arc::new(Frame::blank(width, height, timestamp_ms)));
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

pub struct FakeOpener {
    camera: FakeCamera,
}

impl StreamOpener for FakeOpener {
    fn open(&mut self) -> Result<Box<dyn FrameSource>, CameraError> {
        if self.camera.deny {
            return Err(CameraError::PermissionDenied);
        }
        self.camera.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            camera: self.camera.clone(),
        }))
    }
}

struct FakeStream {
    camera: FakeCamera,
}

impl FrameSource for FakeStream {
    fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.camera.frame.lock().unwrap().clone()
    }

    fn stop(&mut self) {
        self.camera.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize(u32, u32),
    Clear,
    Connector(Landmark, Landmark),
    Landmark(Landmark),
}

/// Surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    pub last_resize: Option<(u32, u32)>,
}

impl RecordingSurface {
    pub fn clear_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == DrawOp::Clear).count()
    }

    pub fn connector_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Connector(..)))
            .count()
    }

    pub fn landmark_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Landmark(_)))
            .count()
    }

    /// Joint markers drawn since the most recent clear.
    pub fn last_drawn_landmarks(&self) -> Vec<Landmark> {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DrawOp::Clear)
            .map_or(0, |i| i + 1);
        self.ops[start..]
            .iter()
            .filter_map(|op| match op {
                DrawOp::Landmark(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.last_resize = Some((width, height));
        self.ops.push(DrawOp::Resize(width, height));
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_connector(&mut self, from: Landmark, to: Landmark, _style: &DrawStyle) {
        self.ops.push(DrawOp::Connector(from, to));
    }

    fn draw_landmark(&mut self, point: Landmark, _style: &DrawStyle) {
        self.ops.push(DrawOp::Landmark(point));
    }
}
