//! Заполнение пропусков статистикой, выученной на обучающей выборке

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
}

impl FromStr for ImputeStrategy {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "most_frequent" => Ok(Self::MostFrequent),
            other => Err(PrepError::InvalidStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::MostFrequent => "most_frequent",
        };
        f.write_str(name)
    }
}

/// Импьютер по колонкам. Значения заполнения хранятся в порядке колонок.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputer<T> {
    strategy: ImputeStrategy,
    fill_values: Option<Vec<T>>,
}

impl<T> SimpleImputer<T> {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: None,
        }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    pub fn fill_values(&self) -> Option<&[T]> {
        self.fill_values.as_deref()
    }
}

impl<T: Clone> SimpleImputer<T> {
    fn apply(&self, columns: &[Vec<Option<T>>]) -> Result<Vec<Vec<T>>, PrepError> {
        let fills = self
            .fill_values
            .as_ref()
            .ok_or(PrepError::NotFitted("SimpleImputer"))?;

        if columns.len() != fills.len() {
            return Err(PrepError::ShapeMismatch {
                expected: fills.len(),
                actual: columns.len(),
            });
        }

        Ok(columns
            .iter()
            .zip(fills)
            .map(|(values, fill)| {
                values
                    .iter()
                    .map(|v| v.clone().unwrap_or_else(|| fill.clone()))
                    .collect()
            })
            .collect())
    }
}

impl SimpleImputer<f64> {
    /// `columns` - пары (имя колонки, значения)
    pub fn fit(&mut self, columns: &[(&str, Vec<Option<f64>>)]) -> Result<(), PrepError> {
        let fills = columns
            .iter()
            .map(|(name, values)| {
                let mut present: Vec<f64> = values.iter().flatten().copied().collect();
                if present.is_empty() {
                    return Err(PrepError::all_missing(*name));
                }
                Ok(match self.strategy {
                    ImputeStrategy::Mean => present.iter().sum::<f64>() / present.len() as f64,
                    ImputeStrategy::Median => median(&mut present),
                    ImputeStrategy::MostFrequent => most_frequent_f64(&present),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.fill_values = Some(fills);
        Ok(())
    }

    pub fn transform(&self, columns: &[Vec<Option<f64>>]) -> Result<Vec<Vec<f64>>, PrepError> {
        self.apply(columns)
    }
}

impl SimpleImputer<String> {
    pub fn fit(&mut self, columns: &[(&str, Vec<Option<String>>)]) -> Result<(), PrepError> {
        if self.strategy != ImputeStrategy::MostFrequent {
            // Для строк осмыслена только мода
            return Err(PrepError::InvalidStrategy(format!(
                "{} (categorical columns support most_frequent only)",
                self.strategy
            )));
        }

        let fills = columns
            .iter()
            .map(|(name, values)| {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for v in values.iter().flatten() {
                    *counts.entry(v.as_str()).or_default() += 1;
                }
                // BTreeMap отсортирован, при равенстве частот берём наименьшее значение
                let mut best: Option<(&str, usize)> = None;
                for (value, count) in counts {
                    if best.map_or(true, |(_, c)| count > c) {
                        best = Some((value, count));
                    }
                }
                best.map(|(value, _)| value.to_string())
                    .ok_or_else(|| PrepError::all_missing(*name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.fill_values = Some(fills);
        Ok(())
    }

    pub fn transform(
        &self,
        columns: &[Vec<Option<String>>],
    ) -> Result<Vec<Vec<String>>, PrepError> {
        self.apply(columns)
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn most_frequent_f64(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut best = (sorted[0], 0usize);
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best.1 {
            best = (sorted[i], j - i);
        }
        i = j;
    }
    best.0
}
