//! One-hot кодирование категориальных колонок

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Что делать с категорией, которой не было в обучающей выборке
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Нулевой блок индикаторов
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    handle_unknown: UnknownCategoryPolicy,
    /// (имя колонки, отсортированные категории)
    categories: Option<Vec<(String, Vec<String>)>>,
}

impl OneHotEncoder {
    pub fn new(handle_unknown: UnknownCategoryPolicy) -> Self {
        Self {
            handle_unknown,
            categories: None,
        }
    }

    pub fn handle_unknown(&self) -> UnknownCategoryPolicy {
        self.handle_unknown
    }

    pub fn categories(&self) -> Option<&[(String, Vec<String>)]> {
        self.categories.as_deref()
    }

    /// Количество выходных колонок (сумма категорий по всем колонкам)
    pub fn n_features_out(&self) -> usize {
        self.categories
            .as_ref()
            .map_or(0, |c| c.iter().map(|(_, cats)| cats.len()).sum())
    }

    pub fn fit(&mut self, columns: &[(&str, Vec<String>)]) -> Result<(), PrepError> {
        let categories = columns
            .iter()
            .map(|(name, values)| {
                if values.is_empty() {
                    return Err(PrepError::EmptyDataset);
                }
                let distinct: BTreeSet<&str> = values.iter().map(String::as_str).collect();
                Ok((
                    name.to_string(),
                    distinct.into_iter().map(str::to_string).collect(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.categories = Some(categories);
        Ok(())
    }

    pub fn transform(&self, columns: &[Vec<String>]) -> Result<Array2<f64>, PrepError> {
        let categories = self
            .categories
            .as_ref()
            .ok_or(PrepError::NotFitted("OneHotEncoder"))?;

        if columns.len() != categories.len() {
            return Err(PrepError::ShapeMismatch {
                expected: categories.len(),
                actual: columns.len(),
            });
        }

        let n_rows = columns.first().map_or(0, Vec::len);
        let mut encoded = Array2::zeros((n_rows, self.n_features_out()));

        let mut offset = 0;
        for (values, (name, cats)) in columns.iter().zip(categories) {
            let mut unknown = 0usize;
            for (i, value) in values.iter().enumerate() {
                match cats.binary_search_by(|c| c.as_str().cmp(value.as_str())) {
                    Ok(pos) => encoded[[i, offset + pos]] = 1.0,
                    Err(_) => match self.handle_unknown {
                        UnknownCategoryPolicy::Ignore => unknown += 1,
                        UnknownCategoryPolicy::Error => {
                            return Err(PrepError::UnknownCategory {
                                column: name.clone(),
                                value: value.clone(),
                            });
                        }
                    },
                }
            }
            if unknown > 0 {
                // одно предупреждение на колонку
                tracing::warn!(
                    column = %name,
                    rows = unknown,
                    "Unknown categories encoded as zeros"
                );
            }
            offset += cats.len();
        }

        Ok(encoded)
    }

    pub fn fit_transform(
        &mut self,
        columns: &[(&str, Vec<String>)],
    ) -> Result<Array2<f64>, PrepError> {
        self.fit(columns)?;
        let values: Vec<Vec<String>> = columns.iter().map(|(_, v)| v.clone()).collect();
        self.transform(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::sync::{Arc, Mutex};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_sorted_categories() {
        let mut encoder = OneHotEncoder::new(UnknownCategoryPolicy::Ignore);
        let out = encoder
            .fit_transform(&[("lunch", strings(&["standard", "free/reduced", "standard"]))])
            .unwrap();

        assert_eq!(
            encoder.categories().unwrap()[0].1,
            strings(&["free/reduced", "standard"])
        );
        assert_eq!(out, array![[0.0, 1.0], [1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_unknown_ignored_as_zeros() {
        let mut encoder = OneHotEncoder::new(UnknownCategoryPolicy::Ignore);
        encoder.fit(&[("gender", strings(&["female", "male"]))]).unwrap();

        let out = encoder.transform(&[strings(&["nonbinary"])]).unwrap();
        assert_eq!(out, array![[0.0, 0.0]]);
    }

    /// Пишет вывод fmt-подписчика в общий буфер
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_unknown_rows_warn_once_per_column() {
        let mut encoder = OneHotEncoder::new(UnknownCategoryPolicy::Ignore);
        encoder.fit(&[("gender", strings(&["female", "male"]))]).unwrap();

        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .finish();

        let unseen = vec!["x".to_string(); 1000];
        let out = tracing::subscriber::with_default(subscriber, || encoder.transform(&[unseen]))
            .unwrap();

        assert_eq!(out.dim(), (1000, 2));
        assert!(out.iter().all(|v| *v == 0.0));

        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("Unknown categories encoded as zeros").count(), 1);
        assert!(text.contains("rows=1000"));
    }

    #[test]
    fn test_unknown_rejected() {
        let mut encoder = OneHotEncoder::new(UnknownCategoryPolicy::Error);
        encoder.fit(&[("gender", strings(&["female", "male"]))]).unwrap();

        let err = encoder.transform(&[strings(&["nonbinary"])]).unwrap_err();
        assert!(matches!(err, PrepError::UnknownCategory { value, .. } if value == "nonbinary"));
    }

    #[test]
    fn test_blocks_are_concatenated() {
        let mut encoder = OneHotEncoder::new(UnknownCategoryPolicy::Ignore);
        let out = encoder
            .fit_transform(&[
                ("a", strings(&["x", "y"])),
                ("b", strings(&["p", "q"])),
            ])
            .unwrap();

        assert_eq!(encoder.n_features_out(), 4);
        assert_eq!(out, array![[1.0, 0.0, 1.0, 0.0], [0.0, 1.0, 0.0, 1.0]]);
    }
}
