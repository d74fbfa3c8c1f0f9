//! Configuration file handling for hand-pose-recorder.
//!
//! Loads configuration from `<config dir>/hand-pose-recorder/config.toml` or a
//! custom path. Every field is optional; missing values fall back to defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::{CameraSettings, Resolution};
use crate::detector::{Delegate, DetectorConfig, DEFAULT_LANDMARKER_COMMAND, DEFAULT_MODEL_ASSET_PATH};
use crate::recorder::{CapturePolicy, DEFAULT_LABEL};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub detector: DetectorSection,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_true")]
    pub mirror: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_camera_fps")]
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            mirror: true,
            width: default_width(),
            height: default_height(),
            fps: default_camera_fps(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct DetectorSection {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_model")]
    pub model_asset_path: String,
    #[serde(default)]
    pub delegate: Delegate,
    #[serde(default = "default_num_hands")]
    pub num_hands: u32,
}

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            model_asset_path: default_model(),
            delegate: Delegate::default(),
            num_hands: default_num_hands(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CaptureConfig {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default)]
    pub hand_index: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            hand_index: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ExportConfig {
    /// Where saved datasets go (default: current directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Refresh ticks per second
    #[serde(default = "default_render_fps")]
    pub fps: u32,
    #[serde(default = "default_canvas_cols")]
    pub canvas_cols: u16,
    #[serde(default = "default_canvas_rows")]
    pub canvas_rows: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: default_render_fps(),
            canvas_cols: default_canvas_cols(),
            canvas_rows: default_canvas_rows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    Resolution::MEDIUM.width
}

fn default_height() -> u32 {
    Resolution::MEDIUM.height
}

fn default_camera_fps() -> u32 {
    30
}

fn default_command() -> String {
    DEFAULT_LANDMARKER_COMMAND.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL_ASSET_PATH.to_string()
}

fn default_num_hands() -> u32 {
    2
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

fn default_render_fps() -> u32 {
    30
}

fn default_canvas_cols() -> u16 {
    80
}

fn default_canvas_rows() -> u16 {
    30
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            device_index: self.camera.device,
            resolution: Resolution {
                width: self.camera.width,
                height: self.camera.height,
            },
            fps: self.camera.fps,
            mirror: self.camera.mirror,
        }
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            command: self.detector.command.clone(),
            args: self.detector.args.clone(),
            model_asset_path: self.detector.model_asset_path.clone(),
            delegate: self.detector.delegate,
            num_hands: self.detector.num_hands,
        }
    }

    pub fn capture_policy(&self) -> CapturePolicy {
        CapturePolicy {
            label: self.capture.label.clone(),
            hand_index: self.capture.hand_index,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("hand-pose-recorder").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/hand-pose-recorder/config.toml")
        })
}

/// Commented template written by `config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# hand-pose-recorder configuration

[camera]
# Camera device index (see `hand-pose-recorder list-cameras`)
device = 0
# Mirror horizontally (selfie mode)
mirror = true
width = 640
height = 480
fps = 30

[detector]
# Landmarker executable speaking the JSON-lines stdio protocol
command = "hand-landmarker"
# Extra arguments passed before --model/--delegate/--num-hands
args = []
model_asset_path = "https://storage.googleapis.com/mediapipe-models/hand_landmarker/hand_landmarker/float16/1/hand_landmarker.task"
# GPU or CPU
delegate = "GPU"
num_hands = 2

[capture]
# Label stored with every captured pose
label = "mute"
# Which detected hand to capture (0 = first)
hand_index = 0

[export]
# Directory for poses-*.json files (default: current directory)
# output_dir = "~/poses"

[render]
# Refresh rate of the detect/draw loop
fps = 30
canvas_cols = 80
canvas_rows = 30
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(Some(&tmp.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.capture.label, "mute");
        assert_eq!(config.capture.hand_index, 0);
        assert_eq!(config.detector.num_hands, 2);
        assert_eq!(config.detector.delegate, Delegate::Gpu);
        assert!(config.camera.mirror);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_overrides() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[capture]\nlabel = \"fist\"\n\n[detector]\ndelegate = \"CPU\"\n\n[export]\noutput_dir = \"/tmp/poses\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.capture_policy().label, "fist");
        assert_eq!(config.detector_config().delegate, Delegate::Cpu);
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/poses"));
        assert_eq!(config.camera_settings().resolution.width, 640);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[capture\nlabel = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
