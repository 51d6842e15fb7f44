//! CSV ingestion of ad performance exports.
//!
//! Schema problems reject the whole file up front. Cell problems never do: an unreadable value
//! becomes a missing metric and is recorded as a [`CellCoercion`] so callers can show it.

mod columns;
mod normalizer;
mod parser;

pub use columns::Column;

use crate::review::domain::AdRecord;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Unit the export uses for its CTR column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtrUnit {
    /// `0.0075` means 0.75%.
    #[default]
    Fraction,
    /// `0.75` (or `0.75%`) means 0.75%.
    Percent,
}

impl FromStr for CtrUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fraction" | "ratio" => Ok(Self::Fraction),
            "percent" | "percentage" | "%" => Ok(Self::Percent),
            other => Err(format!("unknown CTR unit '{other}' (expected fraction or percent)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    #[serde(default)]
    pub ctr_unit: CtrUnit,
}

/// A cell that could not be read and was treated as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellCoercion {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub column: &'static str,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedDataset {
    pub records: Vec<AdRecord>,
    pub coercions: Vec<CellCoercion>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read ad export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("the uploaded file is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

pub struct AdDatasetImporter;

impl AdDatasetImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        options: &ImportOptions,
    ) -> Result<ImportedDataset, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, options)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        options: &ImportOptions,
    ) -> Result<ImportedDataset, ImportError> {
        parser::parse_dataset(reader, options)
    }
}
