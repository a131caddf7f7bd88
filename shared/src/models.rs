//! Event payloads exchanged with clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date::normalize;
use crate::table::{Cell, RowValues, StoredRow, DEFAULT_CATEGORY};

/// A calendar event as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub title: String,
    pub category: String,
    pub row_index: i64,
    pub id: Uuid,
}

impl Event {
    /// Event for a row read back by a listing. Rows without a date are not events.
    pub fn from_listed(row: &StoredRow) -> Option<Self> {
        let values = &row.values;
        if values.date.is_empty() {
            return None;
        }

        Some(Self {
            date: normalize(&values.date),
            time: values.time.non_empty(),
            end_date: values.end_date.non_empty().map(|_| normalize(&values.end_date)),
            title: values.title.to_string(),
            category: category_or_default(&values.category),
            row_index: row.row_index,
            id: row.id,
        })
    }

    /// Event for a row just written, rendered as stored. Dates are not normalized,
    /// so a non-canonical date reads back differently from the next listing.
    pub fn from_written(row: &StoredRow) -> Self {
        let values = &row.values;
        Self {
            date: values.date.to_string(),
            time: values.time.non_empty(),
            end_date: values.end_date.non_empty(),
            title: values.title.to_string(),
            category: category_or_default(&values.category),
            row_index: row.row_index,
            id: row.id,
        }
    }
}

fn category_or_default(cell: &Cell) -> String {
    cell.non_empty()
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Partial event sent by clients on add and update. `null` and absent are the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub date: Option<String>,
    pub time: Option<String>,
    pub end_date: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
}

impl EventInput {
    /// Row cells with defaults applied. Dates are stored as given.
    pub fn into_row(self) -> RowValues {
        let category = self
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        RowValues {
            date: Cell::text(self.date.unwrap_or_default()),
            time: Cell::text(self.time.unwrap_or_default()),
            end_date: Cell::text(self.end_date.unwrap_or_default()),
            title: Cell::text(self.title.unwrap_or_default()),
            category: Cell::text(category),
        }
    }
}
