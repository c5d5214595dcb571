//! Сохранение и загрузка обученного трансформера (postcard)

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PrepError;
use crate::preprocessing::FittedTransformer;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorArtifact {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub transformer: FittedTransformer,
}

/// Пишет трансформер в `path`, создавая недостающие каталоги.
/// Запись не атомарная: параллельные запуски с одним путём не поддерживаются.
pub fn save_object(path: &Path, transformer: &FittedTransformer) -> Result<(), PrepError> {
    let io_err = |source| PrepError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let artifact = PreprocessorArtifact {
        format_version: FORMAT_VERSION,
        created_at: Utc::now(),
        transformer: transformer.clone(),
    };
    let bytes = postcard::to_allocvec(&artifact).map_err(|e| PrepError::Artifact(e.to_string()))?;

    fs::write(path, &bytes).map_err(io_err)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Preprocessor written");
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<PreprocessorArtifact, PrepError> {
    let bytes = fs::read(path).map_err(|source| PrepError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let artifact: PreprocessorArtifact =
        postcard::from_bytes(&bytes).map_err(|e| PrepError::Artifact(e.to_string()))?;

    if artifact.format_version != FORMAT_VERSION {
        return Err(PrepError::Artifact(format!(
            "unsupported format version {} (expected {})",
            artifact.format_version, FORMAT_VERSION
        )));
    }

    Ok(artifact)
}

pub fn load_object(path: &Path) -> Result<FittedTransformer, PrepError> {
    load_artifact(path).map(|a| a.transformer)
}
