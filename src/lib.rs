//! Student ML - предобработка признаков для модели успеваемости студентов

pub mod artifact;
pub mod config;
pub mod error;
pub mod preprocessing;
pub mod transformation;
pub mod types;

pub use artifact::{load_object, save_object};
pub use self::config::TransformationConfig;
pub use error::{PrepError, TransformationError};
pub use preprocessing::*;
pub use transformation::{
    to_dataset, transform_with_target, DataTransformation, TransformationOutput,
};
pub use types::*;
