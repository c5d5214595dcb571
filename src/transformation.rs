//! Обучение трансформера на train и применение к train/test

use std::path::{Path, PathBuf};

use linfa::Dataset;
use ndarray::{concatenate, s, Array1, Array2, Axis, Ix1};
use tracing::info;

use crate::artifact::save_object;
use crate::config::TransformationConfig;
use crate::error::{PrepError, ResultExt, TransformationError};
use crate::preprocessing::{build_transformer, FittedTransformer, TransformerSpec};
use crate::types::{Table, TARGET_COLUMN};

/// Результат шага: матрицы признаков с целевой колонкой в конце и путь к трансформеру
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    pub train: Array2<f64>,
    pub test: Array2<f64>,
    pub preprocessor_path: PathBuf,
    pub feature_names: Vec<String>,
}

pub struct DataTransformation {
    config: TransformationConfig,
}

impl DataTransformation {
    pub fn new(config: TransformationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformationConfig {
        &self.config
    }

    pub fn build_transformer(&self) -> Result<TransformerSpec, TransformationError> {
        build_transformer(self.config.handle_unknown)
    }

    pub fn run_from_paths(
        &self,
        train_path: impl AsRef<Path>,
        test_path: impl AsRef<Path>,
    ) -> Result<TransformationOutput, TransformationError> {
        let train = Table::read_csv(train_path).in_operation("read_data")?;
        let test = Table::read_csv(test_path).in_operation("read_data")?;

        info!(train_rows = train.nrows(), test_rows = test.nrows(), "Train and test data read");
        self.run(&train, &test)
    }

    /// Обучение только на train: статистики test не попадают в трансформер.
    /// При любой ошибке до сохранения ничего не пишется на диск.
    pub fn run(
        &self,
        train: &Table,
        test: &Table,
    ) -> Result<TransformationOutput, TransformationError> {
        train.require_schema().in_operation("validate_schema")?;
        test.require_schema().in_operation("validate_schema")?;

        let train_target = target_column(train).in_operation("read_target")?;
        let test_target = target_column(test).in_operation("read_target")?;

        info!("Obtaining preprocessing object");
        let spec = self.build_transformer()?;

        info!("Applying preprocessing object on training and testing data");
        let fitted = spec.fit(train)?;
        info!(
            n_features = fitted.n_features_out(),
            "Preprocessing object fitted on training data"
        );
        let train_features = fitted.try_transform(train).in_operation("transform_train")?;
        let test_features = fitted.try_transform(test).in_operation("transform_test")?;

        let train_arr =
            append_target(&train_features, &train_target).in_operation("transform_train")?;
        let test_arr =
            append_target(&test_features, &test_target).in_operation("transform_test")?;

        save_object(&self.config.preprocessor_path, &fitted).in_operation("save_object")?;
        info!(path = %self.config.preprocessor_path.display(), "Saved preprocessing object");

        Ok(TransformationOutput {
            train: train_arr,
            test: test_arr,
            preprocessor_path: self.config.preprocessor_path.clone(),
            feature_names: fitted.feature_names(),
        })
    }
}

/// Применяет уже обученный трансформер и дописывает цель, как в `run`
pub fn transform_with_target(
    fitted: &FittedTransformer,
    table: &Table,
) -> Result<Array2<f64>, TransformationError> {
    let target = target_column(table).in_operation("read_target")?;
    let features = fitted.transform(table)?;
    append_target(&features, &target).in_operation("transform")
}

fn target_column(table: &Table) -> Result<Array1<f64>, PrepError> {
    table
        .numeric_column(TARGET_COLUMN)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| PrepError::InvalidValue {
                column: TARGET_COLUMN.to_string(),
                row,
                value: String::new(),
            })
        })
        .collect()
}

fn append_target(
    features: &Array2<f64>,
    target: &Array1<f64>,
) -> Result<Array2<f64>, PrepError> {
    let target = target.view().insert_axis(Axis(1));
    concatenate(Axis(1), &[features.view(), target]).map_err(|_| PrepError::ShapeMismatch {
        expected: features.nrows(),
        actual: target.nrows(),
    })
}

/// Разбивает матрицу (признаки + цель в последней колонке) на `linfa::Dataset`
pub fn to_dataset(array: &Array2<f64>) -> Dataset<f64, f64, Ix1> {
    let last = array.ncols().saturating_sub(1);
    let records = array.slice(s![.., ..last]).to_owned();
    let targets = array.index_axis(Axis(1), last).to_owned();
    Dataset::new(records, targets)
}
