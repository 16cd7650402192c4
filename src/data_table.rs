use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::flipside::Record;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("no column named {0}")]
    UnknownColumn(String),
    #[error("cell {value:?} in column {column} is not a number")]
    BadNumber { column: String, value: String },
    #[error("cell {value:?} in column {column} is not a date")]
    BadDate { column: String, value: String },
}

/// A dynamically-shaped table of query results. Every cell is kept as text,
/// matching what the CSV snapshot can represent; numeric and date
/// interpretation happens at the point of use.
#[derive(Clone, Debug, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl DataTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Builds a table from paginated query records. Columns are the union of
    /// the record fields in first-seen order; a record missing a field gets an
    /// empty cell.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(render_scalar).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// Stable lexicographic sort. ISO-formatted date columns order correctly.
    pub fn sort_by_column(&mut self, name: &str) -> Result<(), TableError> {
        let index = self.column_index(name)?;
        self.rows.sort_by(|a, b| a[index].cmp(&b[index]));
        Ok(())
    }

    /// Sum of a numeric column. Empty cells count as zero.
    pub fn column_sum(&self, name: &str) -> Result<f64, TableError> {
        let index = self.column_index(name)?;
        let mut sum = 0.0;
        for row in &self.rows {
            let cell = &row[index];
            if cell.is_empty() {
                continue;
            }
            sum += cell.parse::<f64>().map_err(|_| TableError::BadNumber {
                column: name.to_string(),
                value: cell.clone(),
            })?;
        }
        Ok(sum)
    }

    /// Mean over the non-empty cells of a numeric column, zero when there are
    /// none.
    pub fn column_mean(&self, name: &str) -> Result<f64, TableError> {
        let index = self.column_index(name)?;
        let mut sum = 0.0;
        let mut count = 0u64;
        for row in &self.rows {
            let cell = &row[index];
            if cell.is_empty() {
                continue;
            }
            sum += cell.parse::<f64>().map_err(|_| TableError::BadNumber {
                column: name.to_string(),
                value: cell.clone(),
            })?;
            count += 1;
        }
        if count == 0 {
            Ok(0.0)
        } else {
            Ok(sum / count as f64)
        }
    }

    /// Writes the snapshot CSV. The leading column is an unnamed row index,
    /// the format the dashboards have always written.
    pub fn write_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push("");
        header.extend(self.columns.iter().map(String::as_str));
        writer.write_record(&header)?;

        for (index, row) in self.rows.iter().enumerate() {
            let mut record = Vec::with_capacity(row.len() + 1);
            let index = index.to_string();
            record.push(index.as_str());
            record.extend(row.iter().map(String::as_str));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Reads a snapshot CSV back, dropping the unnamed index column so the
    /// result equals the table that was written.
    pub fn read_csv(path: &Path) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_path(path)?;

        let headers = reader.headers()?.clone();
        let skip = usize::from(headers.get(0).is_some_and(str::is_empty));

        let columns = headers.iter().skip(skip).map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().skip(skip).map(str::to_string).collect());
        }

        Ok(Self { columns, rows })
    }
}
