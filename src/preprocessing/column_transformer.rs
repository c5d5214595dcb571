//! Маршрутизация колонок по конвейерам и сборка итоговой матрицы признаков

use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PrepError, ResultExt, TransformationError};
use crate::preprocessing::encoding::UnknownCategoryPolicy;
use crate::preprocessing::imputation::ImputeStrategy;
use crate::preprocessing::pipeline::{CategoricalPipeline, NumericPipeline};
use crate::types::{Table, CATEGORICAL_COLUMNS, NUMERICAL_COLUMNS};

pub const NUMERICAL_PIPELINE: &str = "numerical_pipeline";
pub const CATEGORICAL_PIPELINE: &str = "categorical_pipeline";

/// Собирает необученный трансформер для фиксированных групп колонок.
///
/// Числовые: медиана -> стандартизация.
/// Категориальные: мода -> one-hot -> масштабирование без центрирования.
pub fn build_transformer(
    handle_unknown: UnknownCategoryPolicy,
) -> Result<TransformerSpec, TransformationError> {
    let median = "median"
        .parse::<ImputeStrategy>()
        .in_operation("build_transformer")?;
    let most_frequent = "most_frequent"
        .parse::<ImputeStrategy>()
        .in_operation("build_transformer")?;

    let numerical = NumericPipeline::new(&NUMERICAL_COLUMNS, median);
    let categorical = CategoricalPipeline::new(&CATEGORICAL_COLUMNS, most_frequent, handle_unknown)
        .in_operation("build_transformer")?;

    info!("Numerical columns: {:?}", NUMERICAL_COLUMNS);
    info!("Categorical columns: {:?}", CATEGORICAL_COLUMNS);
    tracing::debug!(
        numerical_steps = ?NumericPipeline::STEPS,
        categorical_steps = ?CategoricalPipeline::STEPS,
        "Transformer built"
    );

    Ok(TransformerSpec {
        numerical,
        categorical,
    })
}

/// Необученный трансформер. `fit` поглощает его, повторное обучение невозможно.
#[derive(Debug, Clone)]
pub struct TransformerSpec {
    numerical: NumericPipeline,
    categorical: CategoricalPipeline,
}

impl TransformerSpec {
    pub fn fit(self, table: &Table) -> Result<FittedTransformer, TransformationError> {
        self.try_fit(table).in_operation("fit")
    }

    pub fn fit_transform(
        self,
        table: &Table,
    ) -> Result<(FittedTransformer, Array2<f64>), TransformationError> {
        let fitted = self.fit(table)?;
        let transformed = fitted.transform(table)?;
        Ok((fitted, transformed))
    }

    fn try_fit(mut self, table: &Table) -> Result<FittedTransformer, PrepError> {
        if table.is_empty() {
            return Err(PrepError::EmptyDataset);
        }

        self.numerical.fit(table)?;
        self.categorical.fit(table)?;

        Ok(FittedTransformer {
            numerical: self.numerical,
            categorical: self.categorical,
        })
    }
}

/// Обученный трансформер: параметры только читаются
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    numerical: NumericPipeline,
    categorical: CategoricalPipeline,
}

impl FittedTransformer {
    pub fn numerical(&self) -> &NumericPipeline {
        &self.numerical
    }

    pub fn categorical(&self) -> &CategoricalPipeline {
        &self.categorical
    }

    pub fn transform(&self, table: &Table) -> Result<Array2<f64>, TransformationError> {
        self.try_transform(table).in_operation("transform")
    }

    /// Без метки операции: вызывающий код сам указывает, что трансформируется
    pub(crate) fn try_transform(&self, table: &Table) -> Result<Array2<f64>, PrepError> {
        let numerical = self.numerical.transform(table)?;
        let categorical = self.categorical.transform(table)?;

        concatenate(Axis(1), &[numerical.view(), categorical.view()]).map_err(|_| {
            PrepError::ShapeMismatch {
                expected: numerical.nrows(),
                actual: categorical.nrows(),
            }
        })
    }

    /// Имена выходных колонок: сначала числовые, затем индикаторы
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numerical.feature_names(NUMERICAL_PIPELINE);
        names.extend(self.categorical.feature_names(CATEGORICAL_PIPELINE));
        names
    }

    pub fn n_features_out(&self) -> usize {
        self.numerical.columns().len() + self.categorical.encoder().n_features_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TARGET_COLUMN;

    fn sample_table() -> Table {
        let headers = [
            "gender",
            "race_ethnicity",
            "parental_level_of_education",
            "lunch",
            "test_preparation_course",
            "math_score",
            "reading_score",
            "writing_score",
        ];
        let rows = [
            ["female", "group B", "bachelor's degree", "standard", "none", "72", "72", "74"],
            ["male", "group C", "some college", "free/reduced", "completed", "69", "90", "88"],
            ["female", "group B", "master's degree", "standard", "none", "90", "95", "93"],
        ];
        Table::from_rows(
            headers,
            rows.iter()
                .map(|r| r.iter().map(|c| Some(c.to_string())).collect::<Vec<_>>()),
        )
        .unwrap()
    }

    #[test]
    fn test_column_groups_are_disjoint_and_exclude_target() {
        for num in NUMERICAL_COLUMNS {
            assert!(!CATEGORICAL_COLUMNS.contains(&num));
            assert_ne!(num, TARGET_COLUMN);
        }
        assert!(!CATEGORICAL_COLUMNS.contains(&TARGET_COLUMN));
    }

    #[test]
    fn test_output_layout() {
        let spec = build_transformer(UnknownCategoryPolicy::Ignore).unwrap();
        let (fitted, out) = spec.fit_transform(&sample_table()).unwrap();

        // 2 числовых + 2 + 2 + 3 + 2 + 2 индикатора
        assert_eq!(fitted.n_features_out(), 13);
        assert_eq!(out.dim(), (3, 13));

        let names = fitted.feature_names();
        assert_eq!(names.len(), 13);
        assert_eq!(names[0], "numerical_pipeline__writing_score");
        assert_eq!(names[1], "numerical_pipeline__reading_score");
        assert_eq!(names[2], "categorical_pipeline__gender_female");
    }

    #[test]
    fn test_empty_train_rejected() {
        let empty = Table::from_rows(NUMERICAL_COLUMNS, Vec::<Vec<Option<String>>>::new()).unwrap();
        let spec = build_transformer(UnknownCategoryPolicy::Ignore).unwrap();
        let err = spec.fit(&empty).unwrap_err();
        assert_eq!(err.operation, "fit");
        assert!(matches!(err.source, PrepError::EmptyDataset));
    }

    #[test]
    fn test_missing_feature_column() {
        let table =
            Table::from_rows(["writing_score"], vec![vec![Some("70".to_string())]]).unwrap();
        let spec = build_transformer(UnknownCategoryPolicy::Ignore).unwrap();
        let err = spec.fit(&table).unwrap_err();
        assert!(matches!(
            err.source,
            PrepError::MissingColumn { ref column } if column == "reading_score"
        ));
    }

    #[test]
    fn test_transform_errors_carry_operation() {
        let spec = build_transformer(UnknownCategoryPolicy::Error).unwrap();
        let fitted = spec.fit(&sample_table()).unwrap();
        let narrow =
            Table::from_rows(["writing_score"], vec![vec![Some("70".to_string())]]).unwrap();

        let err = fitted.transform(&narrow).unwrap_err();
        assert_eq!(err.operation, "transform");
        assert!(err.is_missing_column());
    }
}
