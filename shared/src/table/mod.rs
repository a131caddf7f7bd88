//! Row-oriented backing tables for calendar events.
//!
//! A table is a header row (position 1) followed by data rows at positions
//! 2, 3, ... Each data row has five logical cells plus a stable id that never
//! changes when other rows move.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::Result;

pub use memory::MemoryTable;
pub use postgres::PgTable;

/// Header row written when a table is created. The last name has no backing cell.
pub const HEADER: [&str; 6] = ["date", "time", "endDate", "title", "category", "rowIndex"];

/// Position of the first data row.
pub const FIRST_DATA_ROW: i64 = 2;

/// Category stored when none is given.
pub const DEFAULT_CATEGORY: &str = "other";

/// A single cell value as held by a backing table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Text cell, with the empty string collapsing to [`Cell::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// `None` for empty cells, the rendered value otherwise.
    pub fn non_empty(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// The five logical columns of an event row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowValues {
    pub date: Cell,
    pub time: Cell,
    pub end_date: Cell,
    pub title: Cell,
    pub category: Cell,
}

/// A data row together with its identifiers at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub id: Uuid,
    pub row_index: i64,
    pub values: RowValues,
}

/// How a write addresses an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRef {
    /// 1-based sheet position; shifts when earlier rows are removed
    Position(i64),
    /// Stable id assigned at append time
    Id(Uuid),
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRef::Position(row_index) => write!(f, "row {}", row_index),
            RowRef::Id(id) => write!(f, "id {}", id),
        }
    }
}

/// Offset of `row_index` into a table with `rows` data rows, if it names one.
pub fn data_offset(row_index: i64, rows: usize) -> Option<usize> {
    let offset = row_index.checked_sub(FIRST_DATA_ROW)?;
    let offset = usize::try_from(offset).ok()?;
    (offset < rows).then_some(offset)
}

/// Storage for event rows. Implementations create their table on first use.
#[async_trait]
pub trait EventTable: Send + Sync {
    /// Every data row in storage order, empty-date rows included.
    async fn rows(&self) -> Result<Vec<StoredRow>>;

    /// Write `values` after the last row and return it with its new identifiers.
    async fn append(&self, values: RowValues) -> Result<StoredRow>;

    /// Replace all five cells of an existing row.
    async fn overwrite(&self, target: RowRef, values: RowValues) -> Result<()>;

    /// Physically remove a row; later rows move up one position.
    async fn remove(&self, target: RowRef) -> Result<()>;
}
