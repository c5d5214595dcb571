//! Конвейеры для групп колонок: числовой и категориальный

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::PrepError;
use crate::preprocessing::encoding::{OneHotEncoder, UnknownCategoryPolicy};
use crate::preprocessing::imputation::{ImputeStrategy, SimpleImputer};
use crate::preprocessing::normalization::StandardScaler;
use crate::types::Table;

/// Колонки (в порядке колонок) -> матрица n_rows x n_columns
fn to_matrix(columns: &[Vec<f64>], n_rows: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| columns[j][i])
}

/// imputer -> scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericPipeline {
    columns: Vec<String>,
    imputer: SimpleImputer<f64>,
    scaler: StandardScaler,
}

impl NumericPipeline {
    pub const STEPS: [&'static str; 2] = ["imputer", "scaler"];

    pub fn new(columns: &[&str], strategy: ImputeStrategy) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            imputer: SimpleImputer::new(strategy),
            scaler: StandardScaler::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn imputer(&self) -> &SimpleImputer<f64> {
        &self.imputer
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    fn extract(&self, table: &Table) -> Result<Vec<Vec<Option<f64>>>, PrepError> {
        self.columns.iter().map(|c| table.numeric_column(c)).collect()
    }

    pub fn fit(&mut self, table: &Table) -> Result<(), PrepError> {
        let raw = self.extract(table)?;
        let named: Vec<(&str, Vec<Option<f64>>)> =
            self.columns.iter().map(String::as_str).zip(raw.iter().cloned()).collect();

        self.imputer.fit(&named)?;
        let filled = self.imputer.transform(&raw)?;
        self.scaler.fit(&to_matrix(&filled, table.nrows()))?;

        tracing::debug!(
            columns = ?self.columns,
            fill = ?self.imputer.fill_values(),
            mean = ?self.scaler.mean(),
            scale = ?self.scaler.scale(),
            "Numerical pipeline fitted"
        );
        Ok(())
    }

    pub fn transform(&self, table: &Table) -> Result<Array2<f64>, PrepError> {
        let filled = self.imputer.transform(&self.extract(table)?)?;
        self.scaler.transform(&to_matrix(&filled, table.nrows()))
    }

    pub fn feature_names(&self, prefix: &str) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| format!("{}__{}", prefix, c))
            .collect()
    }
}

/// imputer -> one_hot_encoder -> scaler (без центрирования)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalPipeline {
    columns: Vec<String>,
    imputer: SimpleImputer<String>,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
}

impl CategoricalPipeline {
    pub const STEPS: [&'static str; 3] = ["imputer", "one_hot_encoder", "scaler"];

    pub fn new(
        columns: &[&str],
        strategy: ImputeStrategy,
        handle_unknown: UnknownCategoryPolicy,
    ) -> Result<Self, PrepError> {
        if strategy != ImputeStrategy::MostFrequent {
            return Err(PrepError::InvalidStrategy(format!(
                "{} (categorical columns support most_frequent only)",
                strategy
            )));
        }

        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            imputer: SimpleImputer::new(strategy),
            encoder: OneHotEncoder::new(handle_unknown),
            scaler: StandardScaler::without_mean(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn imputer(&self) -> &SimpleImputer<String> {
        &self.imputer
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    fn extract(&self, table: &Table) -> Result<Vec<Vec<Option<String>>>, PrepError> {
        self.columns.iter().map(|c| table.string_column(c)).collect()
    }

    pub fn fit(&mut self, table: &Table) -> Result<(), PrepError> {
        let raw = self.extract(table)?;
        let named: Vec<(&str, Vec<Option<String>>)> =
            self.columns.iter().map(String::as_str).zip(raw.iter().cloned()).collect();

        self.imputer.fit(&named)?;
        let filled = self.imputer.transform(&raw)?;

        let named_filled: Vec<(&str, Vec<String>)> =
            self.columns.iter().map(String::as_str).zip(filled).collect();
        let encoded = self.encoder.fit_transform(&named_filled)?;
        self.scaler.fit(&encoded)?;

        tracing::debug!(
            columns = ?self.columns,
            fill = ?self.imputer.fill_values(),
            n_indicators = self.encoder.n_features_out(),
            "Categorical pipeline fitted"
        );
        Ok(())
    }

    pub fn transform(&self, table: &Table) -> Result<Array2<f64>, PrepError> {
        let filled = self.imputer.transform(&self.extract(table)?)?;
        let encoded = self.encoder.transform(&filled)?;
        self.scaler.transform(&encoded)
    }

    pub fn feature_names(&self, prefix: &str) -> Vec<String> {
        self.encoder
            .categories()
            .unwrap_or_default()
            .iter()
            .flat_map(|(column, cats)| {
                cats.iter()
                    .map(move |cat| format!("{}__{}_{}", prefix, column, cat))
            })
            .collect()
    }
}
