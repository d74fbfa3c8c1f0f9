//! Hand landmark detection.
//!
//! [`HandDetector`] tracks whether the model is loaded and which running
//! mode it is in; the inference itself sits behind [`LandmarkModel`]. The
//! shipped backend is [`ProcessModel`], an external landmarker process.

mod adapter;
mod process;
mod types;

pub use adapter::HandDetector;
pub use process::{ProcessModel, StartupAbort};
pub use types::{
    Delegate, DetectorConfig, DetectorError, LandmarkModel, Readiness, RunningMode,
    DEFAULT_LANDMARKER_COMMAND, DEFAULT_MODEL_ASSET_PATH,
};
