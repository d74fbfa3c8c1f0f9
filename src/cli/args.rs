//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::detector::Delegate;

/// Record labeled hand poses from a webcam and export them as JSON
#[derive(Parser, Debug)]
#[command(name = "hand-pose-recorder")]
#[command(version, about = "Capture labeled hand-landmark poses from a webcam", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Camera device index (from list-cameras)
    #[arg(long)]
    pub camera: Option<u32>,

    /// Do not mirror the camera image
    #[arg(long)]
    pub no_mirror: bool,

    /// Label stored with captured poses
    #[arg(long, short)]
    pub label: Option<String>,

    /// Which detected hand to capture (0 = first)
    #[arg(long)]
    pub hand_index: Option<usize>,

    /// Directory for exported pose files
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Landmarker executable
    #[arg(long)]
    pub landmarker: Option<String>,

    /// Model asset path or URL
    #[arg(long)]
    pub model: Option<String>,

    /// Compute delegate requested from the landmarker
    #[arg(long, value_enum)]
    pub delegate: Option<Delegate>,

    /// Refresh rate of the detect/draw loop
    #[arg(long)]
    pub fps: Option<u32>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Summarize an exported pose file
    Inspect {
        /// Path to a poses-*.json file
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Apply command-line overrides on top of file values.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(camera) = self.camera {
            config.camera.device = camera;
        }
        if self.no_mirror {
            config.camera.mirror = false;
        }
        if let Some(label) = &self.label {
            config.capture.label = label.clone();
        }
        if let Some(hand_index) = self.hand_index {
            config.capture.hand_index = hand_index;
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = Some(dir.clone());
        }
        if let Some(command) = &self.landmarker {
            config.detector.command = command.clone();
        }
        if let Some(model) = &self.model {
            config.detector.model_asset_path = model.clone();
        }
        if let Some(delegate) = self.delegate {
            config.detector.delegate = delegate;
        }
        if let Some(fps) = self.fps {
            config.render.fps = fps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["hand-pose-recorder"]);
        assert!(args.command.is_none());
        assert!(args.camera.is_none());
        assert!(!args.no_mirror);
        assert!(args.label.is_none());
        assert!(args.delegate.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_delegate_values() {
        let args = Args::parse_from(["hand-pose-recorder", "--delegate", "cpu"]);
        assert_eq!(args.delegate, Some(Delegate::Cpu));

        let args = Args::parse_from(["hand-pose-recorder", "--delegate", "gpu"]);
        assert_eq!(args.delegate, Some(Delegate::Gpu));
    }

    #[test]
    fn test_args_invalid_delegate() {
        let result = Args::try_parse_from(["hand-pose-recorder", "--delegate", "tpu"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::parse_from(["hand-pose-recorder", "-l", "fist", "-o", "/tmp/out"]);
        assert_eq!(args.label.as_deref(), Some("fist"));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_args_inspect_subcommand() {
        let args = Args::parse_from(["hand-pose-recorder", "inspect", "poses.json"]);
        match args.command {
            Some(Command::Inspect { file }) => assert_eq!(file, PathBuf::from("poses.json")),
            other => panic!("Expected Inspect, got {:?}", other),
        }
    }

    #[test]
    fn test_args_config_subcommand() {
        let args = Args::parse_from(["hand-pose-recorder", "config", "init"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let args = Args::parse_from([
            "hand-pose-recorder",
            "--camera",
            "2",
            "--no-mirror",
            "--label",
            "peace",
            "--hand-index",
            "1",
            "--fps",
            "15",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.camera.device, 2);
        assert!(!config.camera.mirror);
        assert_eq!(config.capture.label, "peace");
        assert_eq!(config.capture.hand_index, 1);
        assert_eq!(config.render.fps, 15);
        assert_eq!(config.detector.delegate, Delegate::Gpu);
    }

    #[test]
    fn test_no_overrides_keep_file_values() {
        let args = Args::parse_from(["hand-pose-recorder"]);
        let mut config = Config::default();
        config.capture.label = "open".to_string();
        args.apply_to(&mut config);
        assert_eq!(config.capture.label, "open");
        assert!(config.camera.mirror);
    }
}
