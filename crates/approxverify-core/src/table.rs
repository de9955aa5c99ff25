//! Materialized tables exchanged with the engine collaborator.

use crate::{error::EngineError, value::Value};
use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};

///
/// Row
///
/// One ordered row; cell `i` belongs to column `i` of the owning table.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, IntoIterator, PartialEq, Serialize)]
#[into_iterator(owned, ref)]
pub struct Row(Vec<Value>);

impl Row {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

///
/// Table
///
/// Fully materialized, row-oriented result set. Column names are unique and
/// every row carries exactly one value per column.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from column names and raw rows, checking row arity.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }

        Ok(table)
    }

    /// Append one row; its arity must match the column count.
    pub fn push_row(&mut self, row: impl Into<Row>) -> Result<(), EngineError> {
        let row = row.into();
        if row.len() != self.columns.len() {
            return Err(EngineError::RowArity {
                expected: self.columns.len(),
                found: row.len(),
            });
        }

        self.rows.push(row);

        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Resolve a column index or fail with `UnknownColumn`.
    pub fn require_column(&self, name: &str) -> Result<usize, EngineError> {
        self.column_index(name)
            .ok_or_else(|| EngineError::UnknownColumn {
                name: name.to_string(),
            })
    }

    /// Read one cell by row position and column name.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Iterate every value of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value>, EngineError> {
        let index = self.require_column(name)?;

        Ok(self.rows.iter().map(move |row| &row[index]))
    }

    /// Concatenate schema-equal tables in order.
    ///
    /// Column names must match exactly, including order.
    pub fn concat(tables: &[Self]) -> Result<Self, EngineError> {
        let Some(first) = tables.first() else {
            return Err(EngineError::EmptyInput);
        };

        let mut out = Self::new(first.columns.iter().cloned());
        for table in tables {
            if table.columns != first.columns {
                return Err(EngineError::SchemaMismatch {
                    expected: first.columns.clone(),
                    found: table.columns.clone(),
                });
            }
            out.rows.extend(table.rows.iter().cloned());
        }

        Ok(out)
    }

    pub(crate) fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

///
/// TESTS
///
