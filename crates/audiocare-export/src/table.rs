use std::io::Write;

use audiocare_protocol::session::HaSession;

use crate::error::ExportError;
use crate::row::{ExportRow, flatten_session};

/// Rows of several sessions under one header. Columns are the union of every
/// row's columns in first-seen order; a row lacking a column gets an empty
/// cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    columns: Vec<String>,
    rows: Vec<ExportRow>,
}

impl ExportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a HaSession>) -> Self {
        let mut table = Self::new();
        for session in sessions {
            table.push(flatten_session(session));
        }
        table
    }

    pub fn push(&mut self, row: ExportRow) {
        for column in row.columns() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of row `index` aligned to [`Self::columns`].
    pub fn cells(&self, index: usize) -> Option<Vec<&str>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(|column| row.get(column).unwrap_or(""))
                .collect(),
        )
    }

    /// Tab-separated values with a header line. Tabs and line breaks inside
    /// cells are replaced by spaces.
    pub fn write_tsv(&self, out: &mut impl Write) -> Result<(), ExportError> {
        writeln!(out, "{}", join_cells(self.columns.iter().map(String::as_str)))?;
        for index in 0..self.rows.len() {
            let cells = self.cells(index).unwrap_or_default();
            writeln!(out, "{}", join_cells(cells.into_iter()))?;
        }
        tracing::debug!(
            rows = self.rows.len(),
            columns = self.columns.len(),
            "table written as TSV"
        );
        Ok(())
    }

    /// A JSON array with one object per row, columns in row order.
    pub fn write_json(&self, out: &mut impl Write) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut *out, &self.rows)?;
        writeln!(out)?;
        Ok(())
    }
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells
        .map(|cell| cell.replace(['\t', '\r', '\n'], " "))
        .collect::<Vec<_>>()
        .join("\t")
}
