//! Subcommand handlers for list-cameras, config and inspect.

use std::collections::BTreeMap;
use std::path::Path;

use super::args::ConfigAction;
use crate::camera;
use crate::config::{default_path, Config, DEFAULT_CONFIG_TEMPLATE};
use crate::exporter;
use crate::landmarks::PoseCollection;

/// List available cameras and print them to stdout.
pub fn list_cameras() {
    match camera::list_devices() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("No cameras found.");
                println!();
                println!("Make sure your camera is connected and permissions are granted.");
                println!(
                    "On macOS, grant access in System Settings > Privacy & Security > Camera."
                );
            } else {
                println!("Available cameras:");
                for device in devices {
                    println!("  {}", device);
                }
                println!();
                println!("Use --camera <index> to select a camera.");
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            let config = match Config::load(Some(&path)) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            println!("Current configuration:");
            println!(
                "  Camera: {} ({}x{} @ {} fps, mirror: {})",
                config.camera.device,
                config.camera.width,
                config.camera.height,
                config.camera.fps,
                if config.camera.mirror { "yes" } else { "no" }
            );
            println!("  Landmarker: {}", config.detector.command);
            println!("  Model: {}", config.detector.model_asset_path);
            println!(
                "  Delegate: {}, max hands: {}",
                config.detector.delegate.as_str(),
                config.detector.num_hands
            );
            println!(
                "  Capture: label '{}', hand #{}",
                config.capture.label, config.capture.hand_index
            );
            println!("  Output dir: {}", config.output_dir().display());
            println!(
                "  Render: {} fps, canvas {}x{}",
                config.render.fps, config.render.canvas_cols, config.render.canvas_rows
            );
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
        }
        ConfigAction::Init => {
            if path.exists() {
                eprintln!("Config file already exists: {}", path.display());
                eprintln!("Use 'hand-pose-recorder config show' to view current settings.");
                std::process::exit(1);
            }

            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            if let Err(e) = std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", path.display());
        }
    }
}

/// Human-readable summary of a pose collection.
pub fn summarize(poses: &PoseCollection) -> String {
    let mut labels: BTreeMap<&str, usize> = BTreeMap::new();
    let mut lengths: BTreeMap<usize, usize> = BTreeMap::new();
    for pose in poses {
        *labels.entry(pose.label.as_str()).or_default() += 1;
        *lengths.entry(pose.vector.len()).or_default() += 1;
    }

    let mut out = format!("{} poses\n", poses.len());
    if !labels.is_empty() {
        out.push_str("Labels:\n");
        for (label, count) in &labels {
            out.push_str(&format!("  {}: {}\n", label, count));
        }
        out.push_str("Vector lengths:\n");
        for (len, count) in &lengths {
            out.push_str(&format!("  {}: {}\n", len, count));
        }
    }
    out
}

/// Print a summary of an exported pose file.
pub fn inspect(file: &Path) {
    match exporter::load(file) {
        Ok(poses) => {
            println!("{}", file.display());
            print!("{}", summarize(&poses));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
