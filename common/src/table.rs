//! Sparse tabular data
//!
//! Records coming back from the job-search API do not share a schema, so
//! a `Table` is built from the union of every column it has seen. Cells a
//! row does not have are empty strings, which is also how CSV stores them.

use crate::error::{Error, Result};
use crate::types::{value_to_cell, JobRecord};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from API records. Columns appear in first-seen order.
    pub fn from_records(records: &[JobRecord]) -> Self {
        let mut table = Table::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            for key in record.keys() {
                if !index.contains_key(key) {
                    index.insert(key.clone(), table.columns.len());
                    table.columns.push(key.clone());
                }
            }
        }

        for record in records {
            let mut row = vec![String::new(); table.columns.len()];
            for (key, value) in record {
                row[index[key]] = value_to_cell(value);
            }
            table.rows.push(row);
        }

        table
    }

    /// Read a CSV file with a header row.
    ///
    /// Short rows are padded with empty cells; a row with more fields than
    /// the header is an error. Repeated header names get a `.1`, `.2`, ...
    /// suffix so every column stays addressable.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|c| c.is_empty()) {
            return Err(Error::MissingHeader(path.display().to_string()));
        }
        let columns = dedupe_headers(headers);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(Error::TooManyFields {
                    path: path.display().to_string(),
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    found: record.len(),
                    expected: columns.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Write the table as CSV with a header row, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(path)?;
        if !self.columns.is_empty() {
            writer.write_record(&self.columns)?;
        }
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Stack tables on top of each other. The column set is the union of
    /// all inputs in first-seen order; missing cells are left empty.
    pub fn concat(tables: Vec<Table>) -> Self {
        let mut out = Table::default();
        let mut index: HashMap<String, usize> = HashMap::new();

        for table in &tables {
            for column in &table.columns {
                if !index.contains_key(column) {
                    index.insert(column.clone(), out.columns.len());
                    out.columns.push(column.clone());
                }
            }
        }

        for table in tables {
            let mapping: Vec<usize> = table.columns.iter().map(|c| index[c]).collect();
            for row in table.rows {
                let mut merged = vec![String::new(); out.columns.len()];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    merged[target] = cell;
                }
                out.rows.push(merged);
            }
        }

        out
    }

    /// Set every row of `column` to `value`, adding the column if needed.
    pub fn set_constant(&mut self, column: &str, value: &str) {
        let idx = self.ensure_column(column);
        for row in &mut self.rows {
            row[idx] = value.to_string();
        }
    }

    /// Replace the contents of `column` with one value per row.
    ///
    /// Panics if `values.len()` differs from the row count.
    pub fn set_column(&mut self, column: &str, values: Vec<String>) {
        assert_eq!(
            values.len(),
            self.rows.len(),
            "column '{}' needs one value per row",
            column
        );
        let idx = self.ensure_column(column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(idx) = self.column_index(column) {
            return idx;
        }
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell at `row` under `column`, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
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
}

/// Rename repeated header names `name.1`, `name.2`, ... skipping any
/// name already taken.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", header, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        columns.push(name);
    }

    columns
}
