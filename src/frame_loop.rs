//! Acquire → detect → render loop driven by refresh ticks.
//!
//! ```text
//! Idle ──enable──▶ RequestingPermission ──granted──▶ Streaming ──disable──▶ Stopped
//!                        │ denied                                           │
//!                        ▼                                                  │
//!                 (previous state) ◀──────────────── enable ────────────────┘
//! ```
//!
//! Each [`FrameLoop::tick`] runs one iteration: resize the surface to the
//! frame, detect if the frame is new, then redraw from the latest result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::camera::{CameraError, FrameSource, StreamOpener};
use crate::detector::{DetectorError, HandDetector, RunningMode};
use crate::landmarks::LatestDetection;
use crate::render::{render_hands, Surface};

/// Cooperative cancellation flag, checked once per loop iteration.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    RequestingPermission,
    Streaming,
    Stopped,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not streaming, or cancelled: nothing scheduled
    Inactive,
    /// Streaming but the first frame has not been decoded yet
    AwaitingFrame,
    /// Surface redrawn; `detected` is false when the frame was a duplicate
    Rendered { detected: bool },
    /// Still streaming, but the detector failed on this frame
    DetectionFailed,
}

pub struct FrameLoop {
    state: LoopState,
    opener: Box<dyn StreamOpener>,
    source: Option<Box<dyn FrameSource>>,
    cancel: CancellationToken,
    /// Source timestamp of the last frame sent to the detector
    last_frame_timestamp: Option<f64>,
    /// Detection clock; video mode needs non-decreasing timestamps
    clock: Instant,
}

impl FrameLoop {
    pub fn new(opener: Box<dyn StreamOpener>) -> Self {
        let cancel = CancellationToken::new();
        cancel.cancel();
        Self {
            state: LoopState::Idle,
            opener,
            source: None,
            cancel,
            last_frame_timestamp: None,
            clock: Instant::now(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == LoopState::Streaming
    }

    /// Token of the current run; cancelled whenever the loop is not streaming.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request the camera and start a new run.
    ///
    /// On refusal the loop returns to the state it was in.
    pub fn enable(&mut self) -> Result<(), CameraError> {
        match self.state {
            LoopState::Streaming | LoopState::RequestingPermission => return Ok(()),
            LoopState::Idle | LoopState::Stopped => {}
        }

        let previous = self.state;
        self.state = LoopState::RequestingPermission;
        log::info!("Requesting camera stream");

        match self.opener.open() {
            Ok(source) => {
                self.source = Some(source);
                self.cancel = CancellationToken::new();
                self.last_frame_timestamp = None;
                self.state = LoopState::Streaming;
                log::info!("Camera stream granted, loop started");
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                Err(e)
            }
        }
    }

    /// Stop scheduling iterations and release the stream.
    ///
    /// The surface is left as last drawn.
    pub fn disable(&mut self) {
        if self.state != LoopState::Streaming {
            return;
        }
        self.cancel.cancel();
        if let Some(mut source) = self.source.take() {
            source.stop();
        }
        self.state = LoopState::Stopped;
        log::info!("Camera loop stopped");
    }

    /// Enable when idle/stopped, disable when streaming.
    pub fn toggle(&mut self) -> Result<LoopState, CameraError> {
        if self.is_streaming() {
            self.disable();
        } else {
            self.enable()?;
        }
        Ok(self.state)
    }

    /// Run one loop iteration.
    ///
    /// A frame whose timestamp matches the last processed one is rendered
    /// from the stored result without calling the detector.
    pub fn tick(
        &mut self,
        detector: &mut HandDetector,
        latest: &mut LatestDetection,
        surface: &mut dyn Surface,
    ) -> Result<TickOutcome, DetectorError> {
        if self.state != LoopState::Streaming || self.cancel.is_cancelled() {
            return Ok(TickOutcome::Inactive);
        }

        let Some(frame) = self.source.as_ref().and_then(|s| s.latest_frame()) else {
            return Ok(TickOutcome::AwaitingFrame);
        };

        surface.resize(frame.width, frame.height);

        let mut detected = false;
        if self.last_frame_timestamp != Some(frame.timestamp_ms) {
            if detector.running_mode() == RunningMode::Image {
                detector.set_mode(RunningMode::Video)?;
            }
            self.last_frame_timestamp = Some(frame.timestamp_ms);
            let now_ms = self.clock.elapsed().as_secs_f64() * 1000.0;
            latest.store(detector.detect(&frame, now_ms)?);
            detected = true;
        }

        render_hands(surface, latest.get());
        Ok(TickOutcome::Rendered { detected })
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.disable();
    }
}
