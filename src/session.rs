//! Session context: everything one recording session owns.
//!
//! User actions (`toggle_camera`, `capture_pose`, `save_poses`, `show_poses`)
//! and the periodic `refresh` all go through [`Session`]. Failures are
//! logged and written to the status board; none of them end the session.

use std::path::{Path, PathBuf};

use crate::camera::StreamOpener;
use crate::detector::{HandDetector, Readiness};
use crate::exporter::{self, ExportError};
use crate::frame_loop::{FrameLoop, LoopState, TickOutcome};
use crate::landmarks::{LatestDetection, PoseCollection};
use crate::recorder::{CaptureError, CapturePolicy, PoseRecorder};
use crate::render::{render_hands, AsciiCanvas};

/// Text regions shown under the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBoard {
    /// Last user-facing error
    pub error: Option<String>,
    /// Pose count text, e.g. "3 poses saved"
    pub count: Option<String>,
    /// JSON dump from `show_poses`
    pub dump: Option<String>,
    /// Informational line (camera state, saved path)
    pub notice: Option<String>,
}

impl StatusBoard {
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }
}

pub struct Session {
    detector: HandDetector,
    latest: LatestDetection,
    recorder: PoseRecorder,
    frame_loop: FrameLoop,
    canvas: AsciiCanvas,
    /// Configured canvas size; the terminal may only shrink it
    canvas_limit: (u16, u16),
    status: StatusBoard,
    output_dir: PathBuf,
}

impl Session {
    pub fn new(
        opener: Box<dyn StreamOpener>,
        policy: CapturePolicy,
        canvas: AsciiCanvas,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let canvas_limit = canvas.budget();
        Self {
            detector: HandDetector::loading(),
            latest: LatestDetection::new(),
            recorder: PoseRecorder::new(policy),
            frame_loop: FrameLoop::new(opener),
            canvas,
            canvas_limit,
            status: StatusBoard::default(),
            output_dir: output_dir.into(),
        }
    }

    /// Install the detector once loading has finished (or failed).
    pub fn attach_detector(&mut self, detector: HandDetector) {
        if let Readiness::Failed(reason) = detector.readiness() {
            self.status
                .set_error(format!("Hand landmarker failed to load: {}", reason));
        } else if detector.is_ready() {
            self.status.set_notice("Hand landmarker ready. Press w to start the webcam.");
        }
        self.detector = detector;
    }

    pub fn detector(&self) -> &HandDetector {
        &self.detector
    }

    /// Start or stop the webcam loop.
    ///
    /// Does nothing until the detector is ready.
    pub fn toggle_camera(&mut self) -> LoopState {
        if !self.detector.is_ready() {
            log::warn!("Wait! hand landmarker not loaded yet.");
            return self.frame_loop.state();
        }

        match self.frame_loop.toggle() {
            Ok(LoopState::Streaming) => {
                self.status.set_notice("Webcam on");
            }
            Ok(state) => {
                self.status.set_notice("Webcam off");
                return state;
            }
            Err(e) => {
                log::warn!("Camera unavailable: {}", e);
                self.status.set_error(format!("Camera unavailable: {}", e));
            }
        }
        self.frame_loop.state()
    }

    /// Run one loop iteration and redraw the canvas.
    pub fn refresh(&mut self) -> TickOutcome {
        match self
            .frame_loop
            .tick(&mut self.detector, &mut self.latest, &mut self.canvas)
        {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = format!("Detection failed: {}", e);
                // A broken model fails every tick; report it once.
                if self.status.error.as_deref() == Some(message.as_str()) {
                    log::debug!("{}", message);
                } else {
                    log::error!("{}", message);
                    self.status.set_error(message);
                }
                TickOutcome::DetectionFailed
            }
        }
    }

    /// Record the latest detected hand and update the count region.
    pub fn capture_pose(&mut self) -> Result<usize, CaptureError> {
        match self.recorder.capture_pose(&self.latest) {
            Ok(count) => {
                self.status.error = None;
                self.status.count = Some(self.recorder.count_message());
                Ok(count)
            }
            Err(e) => {
                log::warn!("{}", e);
                self.status.set_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Write all poses to a timestamped file in the output directory.
    pub fn save_poses(&mut self) -> Result<PathBuf, ExportError> {
        match exporter::save(self.recorder.poses(), &self.output_dir) {
            Ok(path) => {
                log::info!("Poses saved to file");
                self.status
                    .set_notice(format!("Saved to {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                log::error!("Saving poses failed: {}", e);
                self.status.set_error(format!("Saving poses failed: {}", e));
                Err(e)
            }
        }
    }

    /// Put the count and the JSON of all poses on screen.
    pub fn show_poses(&mut self) {
        self.status.count = Some(self.recorder.count_message());
        match exporter::show(self.recorder.poses()) {
            Ok(json) => self.status.dump = Some(json),
            Err(e) => self.status.set_error(e.to_string()),
        }
    }

    pub fn count(&self) -> usize {
        self.recorder.count()
    }

    pub fn poses(&self) -> &PoseCollection {
        self.recorder.poses()
    }

    pub fn latest(&self) -> &LatestDetection {
        &self.latest
    }

    pub fn loop_state(&self) -> LoopState {
        self.frame_loop.state()
    }

    /// Limit the canvas to `max_cols` × `max_rows` cells (never beyond the
    /// configured size) and redraw the latest result if the grid changed.
    pub fn fit_canvas(&mut self, max_cols: u16, max_rows: u16) {
        let cols = max_cols.min(self.canvas_limit.0);
        let rows = max_rows.min(self.canvas_limit.1);
        if self.canvas.set_budget(cols, rows) {
            render_hands(&mut self.canvas, self.latest.get());
        }
    }

    pub fn canvas(&self) -> &AsciiCanvas {
        &self.canvas
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Stop the camera loop if it is running.
    pub fn shutdown(&mut self) {
        self.frame_loop.disable();
    }
}
