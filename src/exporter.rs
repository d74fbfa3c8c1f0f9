//! Pose dataset export.
//!
//! The artifact is pretty-printed JSON (2-space indent):
//!
//! ```json
//! {
//!   "data": [
//!     { "vector": [0.51, 0.72, -0.0001, ...], "label": "mute" }
//!   ]
//! }
//! ```
//!
//! and is named after the local time it was written,
//! `poses-<day>-<month>-<year>@<hour>h<minute>m<second>s.json`.

use chrono::{Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::landmarks::{LabeledPose, PoseCollection};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize poses: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    data: &'a [LabeledPose],
}

#[derive(Deserialize)]
struct ImportDocument {
    data: Vec<LabeledPose>,
}

/// A serialized dataset ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// File name for an export taken at `when`. No zero padding; month is 1-based.
pub fn file_name_at<T: Datelike + Timelike>(when: &T) -> String {
    format!(
        "poses-{}-{}-{}@{}h{}m{}s.json",
        when.day(),
        when.month(),
        when.year(),
        when.hour(),
        when.minute(),
        when.second()
    )
}

/// Serialize `{ "data": collection }` with 2-space indentation.
pub fn serialize(collection: &PoseCollection) -> Result<String, ExportError> {
    let doc = ExportDocument {
        data: collection.as_slice(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Build the export artifact, named after the current local time.
pub fn export(collection: &PoseCollection) -> Result<Artifact, ExportError> {
    export_at(collection, &Local::now())
}

pub fn export_at<T: Datelike + Timelike>(
    collection: &PoseCollection,
    when: &T,
) -> Result<Artifact, ExportError> {
    Ok(Artifact {
        file_name: file_name_at(when),
        contents: serialize(collection)?,
    })
}

/// Write the artifact into `dir`, creating it if needed.
///
/// An existing file with the same name is overwritten.
pub fn write_artifact(artifact: &Artifact, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.contents).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Export and write in one step.
pub fn save(collection: &PoseCollection, dir: &Path) -> Result<PathBuf, ExportError> {
    let artifact = export(collection)?;
    let path = write_artifact(&artifact, dir)?;
    log::info!("Saved {} poses to {}", collection.len(), path.display());
    Ok(path)
}

/// Compact single-line JSON of the poses, for on-screen display.
pub fn show(collection: &PoseCollection) -> Result<String, ExportError> {
    Ok(serde_json::to_string(collection.as_slice())?)
}

/// Read an exported artifact back into a collection.
pub fn parse(contents: &str) -> Result<PoseCollection, ExportError> {
    let doc: ImportDocument = serde_json::from_str(contents)?;
    Ok(PoseCollection::from(doc.data))
}

/// Read an exported file from disk.
pub fn load(path: &Path) -> Result<PoseCollection, ExportError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&contents)
}
