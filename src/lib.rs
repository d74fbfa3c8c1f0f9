//! hand-pose-recorder library crate.
//!
//! Webcam → hand landmarker → skeleton canvas, plus a labeled pose recorder
//! and JSON exporter. The binary wires these into a terminal app; the
//! modules are public for integration testing.

pub mod camera;
pub mod cli;
pub mod config;
pub mod detector;
pub mod event_loop;
pub mod exporter;
pub mod frame_loop;
pub mod input;
pub mod landmarks;
pub mod recorder;
pub mod render;
pub mod session;
pub mod terminal;

#[cfg(test)]
mod test_support;
