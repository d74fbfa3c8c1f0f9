//! Camera device enumeration.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::types::{CameraError, CameraInfo};

/// List all available camera devices on the system.
///
/// No cameras is an empty list, not an error. A backend that cannot be
/// queried at all is reported as [`CameraError::Unsupported`].
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices =
        query(ApiBackend::Auto).map_err(|e| CameraError::Unsupported(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}
