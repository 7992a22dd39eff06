//! City -> micro market -> locality lookups over a small CSV table.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::TARGET_APP;

pub const CITY_COLUMN: &str = "CItyName";
pub const MICROMARKET_COLUMN: &str = "micromarket";
pub const LOCALITY_COLUMN: &str = "locality";

/// Used when no CSV file is supplied.
pub const BUILTIN_CSV: &str = "CItyName
Delhi
Gurgaon
Mumbai
Pune
Noida
";

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("CSV data must contain '{0}' column")]
    MissingColumn(&'static str),

    #[error("{0} column contains no valid data")]
    NoValues(&'static str),

    #[error("Error loading CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error opening CSV file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Row {
    city: Option<String>,
    micromarket: Option<String>,
    locality: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Taxonomy {
    rows: Vec<Row>,
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Taxonomy {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TaxonomyError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h == name);
        let city_idx = position(CITY_COLUMN).ok_or(TaxonomyError::MissingColumn(CITY_COLUMN))?;
        let micromarket_idx = position(MICROMARKET_COLUMN);
        let locality_idx = position(LOCALITY_COLUMN);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(Row {
                city: cell(&record, Some(city_idx)),
                micromarket: cell(&record, micromarket_idx),
                locality: cell(&record, locality_idx),
            });
        }

        if rows.iter().all(|row| row.city.is_none()) {
            return Err(TaxonomyError::NoValues(CITY_COLUMN));
        }

        debug!(target: TARGET_APP, "Loaded {} taxonomy rows", rows.len());
        Ok(Self { rows })
    }

    pub fn from_csv_str(data: &str) -> Result<Self, TaxonomyError> {
        Self::from_reader(data.as_bytes())
    }

    pub fn from_path(path: &Path) -> Result<Self, TaxonomyError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_csv_str(BUILTIN_CSV)
    }

    /// Distinct cities, sorted.
    pub fn cities(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|row| row.city.as_deref()))
    }

    /// Distinct micro markets of `city`, sorted.
    pub fn micromarkets(&self, city: &str) -> Vec<String> {
        let city = city.trim();
        distinct(
            self.rows
                .iter()
                .filter(|row| row.city.as_deref() == Some(city))
                .map(|row| row.micromarket.as_deref()),
        )
    }

    /// Distinct localities of `micromarket` within `city`, sorted.
    pub fn localities(&self, city: &str, micromarket: &str) -> Vec<String> {
        let (city, micromarket) = (city.trim(), micromarket.trim());
        distinct(
            self.rows
                .iter()
                .filter(|row| {
                    row.city.as_deref() == Some(city)
                        && row.micromarket.as_deref() == Some(micromarket)
                })
                .map(|row| row.locality.as_deref()),
        )
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
