//! Readiness- and mode-aware wrapper around a [`LandmarkModel`].

use crate::camera::Frame;
use crate::landmarks::DetectionResult;

use super::process::{ProcessModel, StartupAbort};
use super::types::{DetectorConfig, DetectorError, LandmarkModel, Readiness, RunningMode};

/// The detector the rest of the app talks to.
///
/// Starts in [`Readiness::Loading`] and only accepts detection calls once a
/// model has been attached. A failed load leaves it permanently inert.
pub struct HandDetector {
    model: Option<Box<dyn LandmarkModel>>,
    readiness: Readiness,
    mode: RunningMode,
}

impl std::fmt::Debug for HandDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandDetector")
            .field("readiness", &self.readiness)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Default for HandDetector {
    fn default() -> Self {
        Self::loading()
    }
}

impl HandDetector {
    /// A detector whose model has not finished loading.
    pub fn loading() -> Self {
        Self {
            model: None,
            readiness: Readiness::Loading,
            mode: RunningMode::Image,
        }
    }

    /// A detector that failed to load and stays inert.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            model: None,
            readiness: Readiness::Failed(reason.into()),
            mode: RunningMode::Image,
        }
    }

    /// Wrap an already loaded model.
    pub fn with_model(model: Box<dyn LandmarkModel>) -> Self {
        Self {
            model: Some(model),
            readiness: Readiness::Ready,
            mode: RunningMode::Image,
        }
    }

    /// Load the landmarker process described by `config`.
    ///
    /// Blocks until the model reports ready; run it off the UI task.
    pub fn initialize(config: &DetectorConfig) -> Self {
        Self::initialize_abortable(config, &StartupAbort::new())
    }

    /// [`HandDetector::initialize`] that `abort` can cut short from another thread.
    pub fn initialize_abortable(config: &DetectorConfig, abort: &StartupAbort) -> Self {
        Self::initialize_with(config, |config| {
            ProcessModel::spawn_abortable(config, abort)
                .map(|m| Box::new(m) as Box<dyn LandmarkModel>)
        })
    }

    /// Load a model through `load`, recording failure instead of returning it.
    pub fn initialize_with<F>(config: &DetectorConfig, load: F) -> Self
    where
        F: FnOnce(&DetectorConfig) -> Result<Box<dyn LandmarkModel>, DetectorError>,
    {
        log::info!(
            "Loading hand landmarker from {} (delegate {}, {} hands)",
            config.model_asset_path,
            config.delegate.as_str(),
            config.num_hands
        );
        match load(config) {
            Ok(model) => {
                log::info!("Hand landmarker ready");
                Self::with_model(model)
            }
            Err(e) => {
                log::error!("Hand landmarker failed to load: {}", e);
                Self::failed(e.to_string())
            }
        }
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    pub fn running_mode(&self) -> RunningMode {
        self.mode
    }

    /// Switch detection mode. Setting the current mode again is a no-op.
    pub fn set_mode(&mut self, mode: RunningMode) -> Result<(), DetectorError> {
        if mode == self.mode {
            return Ok(());
        }
        let model = self.model.as_mut().ok_or(DetectorError::NotReady)?;
        model.set_running_mode(mode)?;
        log::debug!("Detector switched to {} mode", mode.as_str());
        self.mode = mode;
        Ok(())
    }

    /// Run the model on one frame.
    pub fn detect(
        &mut self,
        frame: &Frame,
        timestamp_ms: f64,
    ) -> Result<DetectionResult, DetectorError> {
        let Some(model) = self.model.as_mut() else {
            log::warn!("Wait! hand landmarker not loaded yet.");
            return Err(DetectorError::NotReady);
        };
        model.detect(frame, timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;

    #[test]
    fn test_detect_before_ready_is_not_ready() {
        let mut detector = HandDetector::loading();
        let frame = Frame::blank(2, 2, 0.0);
        assert!(matches!(
            detector.detect(&frame, 0.0),
            Err(DetectorError::NotReady)
        ));
        assert!(!detector.is_ready());
    }

    #[test]
    fn test_failed_initialization_is_inert() {
        let detector = HandDetector::initialize_with(&DetectorConfig::default(), |_| {
            Err(DetectorError::InitFailed("no GPU".to_string()))
        });
        assert!(!detector.is_ready());
        match detector.readiness() {
            Readiness::Failed(reason) => assert!(reason.contains("no GPU")),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_set_mode_reaches_model_once() {
        let model = ScriptedModel::new(vec![]);
        let calls = model.call_log();
        let mut detector = HandDetector::with_model(Box::new(model));

        detector.set_mode(RunningMode::Video).unwrap();
        detector.set_mode(RunningMode::Video).unwrap();

        assert_eq!(detector.running_mode(), RunningMode::Video);
        assert_eq!(calls.mode_switches(), vec![RunningMode::Video]);
    }

    #[test]
    fn test_set_mode_without_model_fails() {
        let mut detector = HandDetector::loading();
        assert!(detector.set_mode(RunningMode::Image).is_ok());
        assert!(matches!(
            detector.set_mode(RunningMode::Video),
            Err(DetectorError::NotReady)
        ));
        assert_eq!(detector.running_mode(), RunningMode::Image);
    }

    #[test]
    fn test_detect_passes_timestamp_through() {
        let model = ScriptedModel::new(vec![]);
        let calls = model.call_log();
        let mut detector = HandDetector::with_model(Box::new(model));

        let frame = Frame::blank(2, 2, 10.0);
        let result = detector.detect(&frame, 42.5).unwrap();

        assert!(result.is_empty());
        assert_eq!(calls.detect_timestamps(), vec![42.5]);
    }
}
