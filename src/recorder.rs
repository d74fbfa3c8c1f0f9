//! Turns the latest detection into labeled pose samples.

use crate::landmarks::{LabeledPose, LatestDetection, PoseCollection};

/// Label attached to captured poses unless configured otherwise.
pub const DEFAULT_LABEL: &str = "mute";

/// Why a capture did not record anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error(
        "No detection results yet. Turn on your webcam to detect your hand pose and capture again."
    )]
    NoResultsYet,

    #[error("No hand #{index} in view ({available} detected). Show your hand to the camera and capture again.")]
    NoHandDetected { index: usize, available: usize },
}

/// Which hand is captured and how it is labeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePolicy {
    pub label: String,
    /// Index into the detection's hand list; 0 is the first detected hand.
    pub hand_index: usize,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            hand_index: 0,
        }
    }
}

/// Owns the session's pose collection.
#[derive(Debug, Default)]
pub struct PoseRecorder {
    poses: PoseCollection,
    policy: CapturePolicy,
}

impl PoseRecorder {
    pub fn new(policy: CapturePolicy) -> Self {
        Self {
            poses: PoseCollection::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &CapturePolicy {
        &self.policy
    }

    /// Snapshot the configured hand from the latest detection.
    ///
    /// Returns the new collection length. On error the collection is
    /// untouched.
    pub fn capture_pose(&mut self, latest: &LatestDetection) -> Result<usize, CaptureError> {
        let result = latest.get().ok_or(CaptureError::NoResultsYet)?;
        let hand = result
            .hand(self.policy.hand_index)
            .filter(|hand| !hand.is_empty())
            .ok_or(CaptureError::NoHandDetected {
                index: self.policy.hand_index,
                available: result.hand_count(),
            })?;

        self.poses
            .push(LabeledPose::new(hand.to_vector(), self.policy.label.clone()));
        log::debug!(
            "Captured '{}' pose with {} values",
            self.policy.label,
            hand.len() * 3
        );
        Ok(self.poses.len())
    }

    pub fn count(&self) -> usize {
        self.poses.len()
    }

    /// Text for the pose-count display. Warns when nothing was captured yet.
    pub fn count_message(&self) -> String {
        if self.poses.is_empty() {
            log::warn!("No poses captured yet. Please capture a pose first.");
        }
        format!("{} poses saved", self.poses.len())
    }

    pub fn poses(&self) -> &PoseCollection {
        &self.poses
    }
}
