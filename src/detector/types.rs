//! Detector configuration, modes and errors.

use serde::{Deserialize, Serialize};

use crate::camera::Frame;
use crate::landmarks::DetectionResult;

/// Hosted float16 hand landmarker bundle.
pub const DEFAULT_MODEL_ASSET_PATH: &str = "https://storage.googleapis.com/mediapipe-models/hand_landmarker/hand_landmarker/float16/1/hand_landmarker.task";

/// Executable speaking the landmarker stdio protocol.
pub const DEFAULT_LANDMARKER_COMMAND: &str = "hand-landmarker";

/// Compute backend requested from the model runtime.
///
/// The runtime decides how to fall back when the preferred delegate is
/// unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Delegate {
    #[default]
    Gpu,
    Cpu,
}

impl Delegate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delegate::Gpu => "GPU",
            Delegate::Cpu => "CPU",
        }
    }
}

/// Detection mode. Video mode expects monotonically non-decreasing
/// timestamps across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunningMode {
    #[default]
    Image,
    Video,
}

impl RunningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunningMode::Image => "IMAGE",
            RunningMode::Video => "VIDEO",
        }
    }
}

/// Settings used to load the hand landmark model.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Landmarker executable
    pub command: String,
    /// Extra arguments placed before the generated model arguments
    pub args: Vec<String>,
    pub model_asset_path: String,
    pub delegate: Delegate,
    /// Maximum number of hands to detect per frame
    pub num_hands: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_LANDMARKER_COMMAND.to_string(),
            args: Vec::new(),
            model_asset_path: DEFAULT_MODEL_ASSET_PATH.to_string(),
            delegate: Delegate::default(),
            num_hands: 2,
        }
    }
}

/// Initialization state of the detector.
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    /// Model still loading
    Loading,
    Ready,
    Failed(String),
}

/// Errors raised by the detector and its model backends.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("hand landmarker not loaded yet")]
    NotReady,

    #[error("failed to initialize hand landmarker: {0}")]
    InitFailed(String),

    #[error("failed to start landmarker '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("landmarker protocol error: {0}")]
    Protocol(String),

    #[error("landmarker reported an error: {0}")]
    Model(String),

    #[error("landmarker I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A loaded hand landmark model.
///
/// Implementations do the actual inference; [`super::HandDetector`] owns
/// readiness and mode bookkeeping.
pub trait LandmarkModel: Send {
    fn set_running_mode(&mut self, mode: RunningMode) -> Result<(), DetectorError>;

    fn detect(&mut self, frame: &Frame, timestamp_ms: f64) -> Result<DetectionResult, DetectorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegate_wire_names() {
        assert_eq!(Delegate::Gpu.as_str(), "GPU");
        assert_eq!(serde_json::to_string(&Delegate::Cpu).unwrap(), "\"CPU\"");
        let parsed: Delegate = serde_json::from_str("\"GPU\"").unwrap();
        assert_eq!(parsed, Delegate::Gpu);
    }

    #[test]
    fn test_running_mode_defaults_to_image() {
        assert_eq!(RunningMode::default(), RunningMode::Image);
        assert_eq!(serde_json::to_string(&RunningMode::Video).unwrap(), "\"VIDEO\"");
    }

    #[test]
    fn test_default_config_requests_two_hands_on_gpu() {
        let config = DetectorConfig::default();
        assert_eq!(config.num_hands, 2);
        assert_eq!(config.delegate, Delegate::Gpu);
        assert!(config.model_asset_path.ends_with("hand_landmarker.task"));
    }
}
