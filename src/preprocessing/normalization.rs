//! Нормализация данных

#![allow(non_snake_case)]

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Стандартизация по колонкам: (X - mean) / std.
/// При `with_mean = false` только деление на std (для one-hot колонок).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    mean: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            with_mean: true,
            mean: None,
            scale: None,
        }
    }

    pub fn without_mean() -> Self {
        Self {
            with_mean: false,
            ..Self::new()
        }
    }

    pub fn with_mean(&self) -> bool {
        self.with_mean
    }

    pub fn mean(&self) -> Option<&[f64]> {
        self.mean.as_deref()
    }

    pub fn scale(&self) -> Option<&[f64]> {
        self.scale.as_deref()
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<(), PrepError> {
        if X.nrows() == 0 {
            return Err(PrepError::EmptyDataset);
        }

        // Вычисляем среднее и стандартное отклонение по каждому признаку
        let mean = X.mean_axis(Axis(0)).ok_or(PrepError::EmptyDataset)?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        self.mean = Some(mean.to_vec());
        self.scale = Some(std.to_vec());
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>, PrepError> {
        let mean = self.mean.as_ref().ok_or(PrepError::NotFitted("StandardScaler"))?;
        let std = self.scale.as_ref().ok_or(PrepError::NotFitted("StandardScaler"))?;

        if X.ncols() != std.len() {
            return Err(PrepError::ShapeMismatch {
                expected: std.len(),
                actual: X.ncols(),
            });
        }

        let mut normalized = X.clone();
        for mut row in normalized.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                let centered = if self.with_mean { *val - mean[i] } else { *val };
                *val = centered / std[i];
            }
        }

        Ok(normalized)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>, PrepError> {
        self.fit(X)?;
        self.transform(X)
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}
