//! Hand landmark data model.
//!
//! A detection produces zero or more [`Hand`]s, each an ordered run of 21
//! [`Landmark`]s in normalized image coordinates. Captured poses are stored
//! as flat [`PoseVector`]s tagged with a label.

use serde::{Deserialize, Serialize};

/// Number of landmarks the hand model reports per hand.
pub const LANDMARKS_PER_HAND: usize = 21;

/// Coordinates stored per landmark in a pose vector (x, y, z).
pub const COORDS_PER_LANDMARK: usize = 3;

/// Length of a pose vector derived from a full hand (21 × 3).
pub const POSE_VECTOR_LEN: usize = LANDMARKS_PER_HAND * COORDS_PER_LANDMARK;

/// Skeleton topology of the 21-point hand model, as landmark index pairs.
///
/// Palm first, then thumb, index, middle, ring and pinky chains.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (0, 5),
    (9, 13),
    (13, 17),
    (5, 9),
    (0, 17),
    (1, 2),
    (2, 3),
    (3, 4),
    (5, 6),
    (6, 7),
    (7, 8),
    (9, 10),
    (10, 11),
    (11, 12),
    (13, 14),
    (14, 15),
    (15, 16),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// One detected hand joint in normalized image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A flattened hand pose: `[x0, y0, z0, x1, y1, z1, ...]`.
pub type PoseVector = Vec<f32>;

/// Ordered landmark sequence of a single hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand {
    pub landmarks: Vec<Landmark>,
}

impl Hand {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Flatten the landmarks into a pose vector, preserving landmark order.
    pub fn to_vector(&self) -> PoseVector {
        self.landmarks
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }
}

/// Output of one detection call.
///
/// An empty `hands` list is the "nothing detected" case; there is no
/// separate absent state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(rename = "landmarks", default)]
    pub hands: Vec<Hand>,
}

impl DetectionResult {
    pub fn new(hands: Vec<Hand>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn hand(&self, index: usize) -> Option<&Hand> {
        self.hands.get(index)
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// Single-slot holder for the most recent detection.
///
/// Written by the frame loop, read by rendering and pose capture. Each
/// store replaces the previous result.
#[derive(Debug, Default)]
pub struct LatestDetection {
    slot: Option<DetectionResult>,
}

impl LatestDetection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, result: DetectionResult) {
        self.slot = Some(result);
    }

    pub fn get(&self) -> Option<&DetectionResult> {
        self.slot.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }
}

/// A pose vector tagged with its category label.
///
/// Field order matters for export: `vector` serializes before `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPose {
    pub vector: PoseVector,
    pub label: String,
}

impl LabeledPose {
    pub fn new(vector: PoseVector, label: impl Into<String>) -> Self {
        Self {
            vector,
            label: label.into(),
        }
    }
}

/// Append-only, ordered collection of captured poses for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseCollection {
    poses: Vec<LabeledPose>,
}

impl PoseCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pose: LabeledPose) {
        self.poses.push(pose);
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledPose> {
        self.poses.iter()
    }

    pub fn as_slice(&self) -> &[LabeledPose] {
        &self.poses
    }
}

impl From<Vec<LabeledPose>> for PoseCollection {
    fn from(poses: Vec<LabeledPose>) -> Self {
        Self { poses }
    }
}

impl<'a> IntoIterator for &'a PoseCollection {
    type Item = &'a LabeledPose;
    type IntoIter = std::slice::Iter<'a, LabeledPose>;

    fn into_iter(self) -> Self::IntoIter {
        self.poses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_with_offset(offset: f32) -> Hand {
        Hand::new(
            (0..LANDMARKS_PER_HAND)
                .map(|i| Landmark::new(i as f32 + offset, i as f32 * 10.0, -(i as f32)))
                .collect(),
        )
    }

    #[test]
    fn test_to_vector_length_is_three_per_landmark() {
        let hand = hand_with_offset(0.0);
        assert_eq!(hand.to_vector().len(), POSE_VECTOR_LEN);

        let partial = Hand::new(vec![Landmark::new(1.0, 2.0, 3.0); 4]);
        assert_eq!(partial.to_vector().len(), 12);
    }

    #[test]
    fn test_to_vector_preserves_landmark_order() {
        let hand = Hand::new(vec![
            Landmark::new(0.1, 0.2, 0.3),
            Landmark::new(0.4, 0.5, 0.6),
        ]);
        assert_eq!(hand.to_vector(), vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_connections_reference_valid_landmarks() {
        for (a, b) in HAND_CONNECTIONS {
            assert!(a < LANDMARKS_PER_HAND);
            assert!(b < LANDMARKS_PER_HAND);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_latest_detection_overwrites() {
        let mut latest = LatestDetection::new();
        assert!(!latest.is_set());

        latest.store(DetectionResult::new(vec![hand_with_offset(0.0)]));
        latest.store(DetectionResult::new(vec![hand_with_offset(5.0)]));

        let stored = latest.get().unwrap();
        assert_eq!(stored.hand_count(), 1);
        assert_eq!(stored.hands[0].landmarks[0].x, 5.0);
    }

    #[test]
    fn test_detection_result_wire_shape() {
        let json = r#"{"landmarks":[[{"x":0.5,"y":0.25,"z":-0.125}]]}"#;
        let result: DetectionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.hand_count(), 1);
        assert_eq!(result.hands[0].landmarks[0], Landmark::new(0.5, 0.25, -0.125));

        let missing: DetectionResult = serde_json::from_str("{}").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_labeled_pose_field_order() {
        let pose = LabeledPose::new(vec![1.0, 2.0], "mute");
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(json, r#"{"vector":[1.0,2.0],"label":"mute"}"#);
    }
}
