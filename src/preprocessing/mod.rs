/// Модуль предобработки данных

pub mod column_transformer;
pub mod encoding;
pub mod imputation;
pub mod normalization;
pub mod pipeline;

pub use column_transformer::{build_transformer, FittedTransformer, TransformerSpec};
pub use encoding::{OneHotEncoder, UnknownCategoryPolicy};
pub use imputation::{ImputeStrategy, SimpleImputer};
pub use normalization::StandardScaler;
pub use pipeline::{CategoricalPipeline, NumericPipeline};
