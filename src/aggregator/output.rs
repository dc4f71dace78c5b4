//! The published JSON artifact.
//!
//! Shape: `{"generatedAt": RFC 3339, "forecasts": {regionId: [{date, aviLevel}] | null}}`
//! with region ids sorted. `null` marks a region that issues no rating.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregator::result::{CanonicalResult, RegionEntry};
use crate::forecast::Forecast;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("artifact I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Artifact {
    #[serde(rename = "generatedAt")]
    generated_at: Option<DateTime<Utc>>,
    forecasts: BTreeMap<String, Option<Forecast>>,
}

pub fn to_json(result: &CanonicalResult) -> Result<String, OutputError> {
    let artifact = Artifact {
        generated_at: result.generated_at(),
        forecasts: result
            .entries()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.forecast().cloned()))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&artifact)?)
}

pub fn from_json(json: &str) -> Result<CanonicalResult, OutputError> {
    let artifact: Artifact = serde_json::from_str(json)?;
    let entries = artifact
        .forecasts
        .into_iter()
        .map(|(id, forecast)| {
            let entry = forecast.map_or(RegionEntry::NoRating, RegionEntry::Forecast);
            (id, entry)
        })
        .collect();
    Ok(CanonicalResult::new(artifact.generated_at, entries))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write the artifact next to `path` and rename it into place, so a reader
/// sees either the previous artifact or the complete new one.
pub async fn write_artifact(path: &Path, result: &CanonicalResult) -> Result<(), OutputError> {
    let json = to_json(result)?;
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    }
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

/// Previously published artifact, or `None` if there is none yet.
pub async fn read_artifact(path: &Path) -> Result<Option<CanonicalResult>, OutputError> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => from_json(&json).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(OutputError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
