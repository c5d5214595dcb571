/// Типы данных и фиксированная схема датасета успеваемости студентов

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

pub const NUMERICAL_COLUMNS: [&str; 2] = ["writing_score", "reading_score"];

pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "race_ethnicity",
    "parental_level_of_education",
    "lunch",
    "test_preparation_course",
];

pub const TARGET_COLUMN: &str = "math_score";

/// Значения, которые считаются пропуском
const NA_MARKERS: [&str; 6] = ["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Сырая таблица: заголовок + строки, пропуск = `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Десериализация идёт через `from_rows`, чтобы проверялась ширина строк
#[derive(Deserialize)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl TryFrom<RawTable> for Table {
    type Error = PrepError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        Table::from_rows(raw.headers, raw.rows)
    }
}

impl Table {
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Result<Self, PrepError>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<String>>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut table_rows = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            let row: Vec<Option<String>> =
                row.into_iter().map(|c| c.and_then(normalize_cell)).collect();
            if row.len() != headers.len() {
                return Err(PrepError::InvalidValue {
                    column: "<row>".to_string(),
                    row: i,
                    value: format!("{} cells for {} headers", row.len(), headers.len()),
                });
            }
            table_rows.push(row);
        }

        Ok(Self {
            headers,
            rows: table_rows,
        })
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, PrepError> {
        let path = path.as_ref();
        let csv_err = |source| PrepError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_err)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            rows.push(record.iter().map(|c| normalize_cell(c.to_string())).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, PrepError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PrepError::missing_column(name))
    }

    pub fn string_column(&self, name: &str) -> Result<Vec<Option<String>>, PrepError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, PrepError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match &row[idx] {
                None => Ok(None),
                Some(raw) => raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(|| PrepError::InvalidValue {
                        column: name.to_string(),
                        row: i,
                        value: raw.clone(),
                    }),
            })
            .collect()
    }

    /// Проверяет, что все колонки признаков и цель присутствуют
    pub fn require_schema(&self) -> Result<(), PrepError> {
        NUMERICAL_COLUMNS
            .iter()
            .chain(CATEGORICAL_COLUMNS.iter())
            .chain(std::iter::once(&TARGET_COLUMN))
            .try_for_each(|name| self.column_index(name).map(|_| ()))
    }
}

fn normalize_cell(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
        None
    } else if trimmed.len() == raw.len() {
        Some(raw)
    } else {
        Some(trimmed.to_string())
    }
}
