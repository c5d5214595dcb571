//! Конфигурация шага трансформации

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PrepError;
use crate::preprocessing::UnknownCategoryPolicy;

pub const ENV_PREFIX: &str = "STUDENT_ML";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationConfig {
    /// Куда сохраняется обученный трансформер
    #[serde(default = "default_preprocessor_path")]
    pub preprocessor_path: PathBuf,
    #[serde(default)]
    pub handle_unknown: UnknownCategoryPolicy,
}

fn default_preprocessor_path() -> PathBuf {
    Path::new("artifacts").join("preprocessor.bin")
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            preprocessor_path: default_preprocessor_path(),
            handle_unknown: UnknownCategoryPolicy::default(),
        }
    }
}

impl TransformationConfig {
    /// Значения по умолчанию -> TOML-файл (если указан) -> переменные окружения `STUDENT_ML_*`
    pub fn load(file: Option<&Path>) -> Result<Self, PrepError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn with_preprocessor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preprocessor_path = path.into();
        self
    }

    pub fn with_handle_unknown(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.handle_unknown = policy;
        self
    }
}
