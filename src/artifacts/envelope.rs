//! Versioned JSON envelope around every persisted artifact

use crate::error::{Result, TurnoverError};
use crate::preprocessing::Scaler;
use crate::training::{LogisticRegression, RandomForest};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Current on-disk format
pub const FORMAT_VERSION: u32 = 1;

/// A value that can be stored as an artifact file.
pub trait Artifact: Serialize + DeserializeOwned {
    /// Tag written to the envelope and checked on load
    const KIND: &'static str;
}

impl Artifact for LogisticRegression {
    const KIND: &'static str = "logistic_regression";
}

impl Artifact for Scaler {
    const KIND: &'static str = "scaler";
}

impl Artifact for RandomForest {
    const KIND: &'static str = "random_forest";
}

/// Ordered feature-name list
impl Artifact for Vec<String> {
    const KIND: &'static str = "feature_list";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub kind: String,
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub payload: T,
}

impl<'a, T: Artifact> ArtifactEnvelope<&'a T> {
    pub fn wrap(payload: &'a T) -> Self {
        Self {
            kind: T::KIND.to_string(),
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            payload,
        }
    }
}

/// Name used in error messages: the file name only, never the full path.
pub(crate) fn artifact_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string())
}

/// Write `value` to `path` inside an envelope, creating parent directories.
pub fn save_artifact<T: Artifact>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &ArtifactEnvelope::wrap(value))?;
    Ok(())
}

/// Read an artifact written by [`save_artifact`].
///
/// Kind and version are checked before the payload is decoded.
pub fn load_artifact<T: Artifact>(path: &Path) -> Result<T> {
    let label = artifact_label(path);

    let file = File::open(path).map_err(|e| TurnoverError::load(&label, e))?;
    let envelope: ArtifactEnvelope<serde_json::Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| TurnoverError::load(&label, e))?;

    if envelope.kind != T::KIND {
        return Err(TurnoverError::load(
            &label,
            format!("expected kind {:?}, found {:?}", T::KIND, envelope.kind),
        ));
    }
    if envelope.format_version != FORMAT_VERSION {
        return Err(TurnoverError::load(
            &label,
            format!("unsupported format version {}", envelope.format_version),
        ));
    }

    serde_json::from_value(envelope.payload).map_err(|e| TurnoverError::load(&label, e))
}
