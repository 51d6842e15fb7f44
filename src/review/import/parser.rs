use super::columns::{resolve_headers, Column};
use super::{CellCoercion, CtrUnit, ImportError, ImportOptions, ImportedDataset};
use crate::review::domain::AdRecord;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::io::Read;
use tracing::debug;

pub(crate) fn parse_dataset<R: Read>(
    reader: R,
    options: &ImportOptions,
) -> Result<ImportedDataset, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let (headers, missing) = resolve_headers(csv_reader.headers()?);
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(
            missing.iter().map(|column| column.header().to_string()).collect(),
        ));
    }
    csv_reader.set_headers(headers);
    let headers = csv_reader.byte_headers()?.clone();

    // Byte records so a cell that is not UTF-8 only costs that cell.
    let mut dataset = ImportedDataset::default();
    for (index, record) in csv_reader.byte_records().enumerate() {
        let record = record?;
        let row: AdRow = record.deserialize(Some(&headers))?;
        if row.is_blank() {
            continue;
        }
        let line = record
            .position()
            .map_or(index + 2, |position| position.line() as usize);
        let record = row.into_record(line, options.ctr_unit, &mut dataset.coercions);
        dataset.records.push(record);
    }

    Ok(dataset)
}

#[derive(Debug, Deserialize)]
struct AdRow {
    #[serde(default, deserialize_with = "blank_cell_as_none")]
    ad_name: Option<Cell>,
    #[serde(default, deserialize_with = "blank_cell_as_none")]
    amount_spent: Option<Cell>,
    #[serde(default, deserialize_with = "blank_cell_as_none")]
    ctr: Option<Cell>,
    #[serde(default, deserialize_with = "blank_cell_as_none")]
    cpc: Option<Cell>,
    #[serde(default, deserialize_with = "blank_cell_as_none")]
    link_clicks: Option<Cell>,
    #[serde(default, deserialize_with = "blank_cell_as_none")]
    roas: Option<Cell>,
}

/// Raw cell contents. Undecodable cells keep a lossy copy for display.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cell {
    Text(String),
    Undecodable(String),
}

impl Cell {
    fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Undecodable(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    fn into_text(self) -> String {
        match self {
            Self::Text(text) | Self::Undecodable(text) => text,
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a CSV cell")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Cell, E> {
                Ok(Cell::Text(value.to_string()))
            }

            fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Cell, E> {
                Ok(Cell::from_bytes(value))
            }
        }

        deserializer.deserialize_bytes(CellVisitor)
    }
}

impl AdRow {
    fn is_blank(&self) -> bool {
        self.ad_name.is_none()
            && self.amount_spent.is_none()
            && self.ctr.is_none()
            && self.cpc.is_none()
            && self.link_clicks.is_none()
            && self.roas.is_none()
    }

    fn into_record(
        self,
        line: usize,
        ctr_unit: CtrUnit,
        coercions: &mut Vec<CellCoercion>,
    ) -> AdRecord {
        let mut cell = |column: Column, raw: Option<Cell>, parse: fn(&str) -> Option<f64>| {
            let parsed = match raw? {
                Cell::Text(text) => parse(&text).ok_or(text),
                Cell::Undecodable(lossy) => Err(lossy),
            };
            let raw = match parsed {
                Ok(value) => return Some(value),
                Err(raw) => raw,
            };
            debug!(line, column = column.header(), value = %raw, "coerced cell to N/A");
            coercions.push(CellCoercion {
                line,
                column: column.header(),
                raw,
            });
            None
        };

        let spend = cell(Column::AmountSpent, self.amount_spent, parse_amount);
        let cpc = cell(Column::Cpc, self.cpc, parse_amount);
        let roas = cell(Column::Roas, self.roas, parse_amount);
        let clicks = cell(Column::LinkClicks, self.link_clicks, parse_count);
        let ctr = match ctr_unit {
            CtrUnit::Fraction => cell(Column::Ctr, self.ctr, parse_ctr_fraction),
            CtrUnit::Percent => cell(Column::Ctr, self.ctr, parse_ctr_percent),
        };

        AdRecord {
            name: self
                .ad_name
                .map(Cell::into_text)
                .unwrap_or_else(|| format!("Row {line}")),
            spend,
            ctr,
            cpc,
            clicks: clicks.map(|count| count as u64),
            roas,
        }
    }
}

fn blank_cell_as_none<'de, D>(deserializer: D) -> Result<Option<Cell>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Cell>::deserialize(deserializer)?;
    Ok(opt.filter(|cell| !cell.is_blank()))
}

/// Non-negative decimal, tolerating a leading `$` and thousands separators.
fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned = unsigned.replace(',', "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Whole number that fits a `u64` click counter.
fn parse_count(raw: &str) -> Option<f64> {
    parse_amount(raw).filter(|value| value.fract() == 0.0 && *value < u64::MAX as f64)
}

fn parse_ctr_fraction(raw: &str) -> Option<f64> {
    parse_amount(raw).filter(|value| *value <= 1.0)
}

fn parse_ctr_percent(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_amount(number)
        .map(|value| value / 100.0)
        .filter(|value| *value <= 1.0)
}
