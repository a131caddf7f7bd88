//! Process-local sheet used for local runs and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{data_offset, EventTable, RowRef, RowValues, StoredRow, FIRST_DATA_ROW, HEADER};
use crate::{Error, Result};

#[derive(Debug)]
struct Sheet {
    header: Vec<String>,
    rows: Vec<(Uuid, RowValues)>,
}

impl Sheet {
    fn create() -> Self {
        debug!("Creating events sheet with header row");
        Self {
            header: HEADER.iter().map(|name| name.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn locate(&self, target: RowRef) -> Result<usize> {
        match target {
            RowRef::Position(row_index) => data_offset(row_index, self.rows.len())
                .ok_or_else(|| Error::out_of_range(row_index, self.rows.len())),
            RowRef::Id(id) => self
                .rows
                .iter()
                .position(|(row_id, _)| *row_id == id)
                .ok_or(Error::NotFound(id)),
        }
    }
}

/// In-memory sheet. The sheet does not exist until the first operation touches it.
#[derive(Debug, Default)]
pub struct MemoryTable {
    sheet: RwLock<Option<Sheet>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet pre-filled with `rows`, as if typed in by hand.
    pub fn with_rows(rows: impl IntoIterator<Item = RowValues>) -> Self {
        let mut sheet = Sheet::create();
        sheet
            .rows
            .extend(rows.into_iter().map(|values| (Uuid::new_v4(), values)));
        Self {
            sheet: RwLock::new(Some(sheet)),
        }
    }

    /// Header row, or `None` if the sheet has not been created yet.
    pub async fn header(&self) -> Option<Vec<String>> {
        self.sheet.read().await.as_ref().map(|s| s.header.clone())
    }

    /// Number of data rows, empty-date rows included.
    pub async fn row_count(&self) -> usize {
        self.sheet.read().await.as_ref().map_or(0, |s| s.rows.len())
    }
}

#[async_trait]
impl EventTable for MemoryTable {
    async fn rows(&self) -> Result<Vec<StoredRow>> {
        let mut guard = self.sheet.write().await;
        let sheet = guard.get_or_insert_with(Sheet::create);

        Ok(sheet
            .rows
            .iter()
            .zip(FIRST_DATA_ROW..)
            .map(|((id, values), row_index)| StoredRow {
                id: *id,
                row_index,
                values: values.clone(),
            })
            .collect())
    }

    async fn append(&self, values: RowValues) -> Result<StoredRow> {
        let mut guard = self.sheet.write().await;
        let sheet = guard.get_or_insert_with(Sheet::create);

        let id = Uuid::new_v4();
        let row_index = sheet.rows.len() as i64 + FIRST_DATA_ROW;
        sheet.rows.push((id, values.clone()));

        Ok(StoredRow {
            id,
            row_index,
            values,
        })
    }

    async fn overwrite(&self, target: RowRef, values: RowValues) -> Result<()> {
        let mut guard = self.sheet.write().await;
        let sheet = guard.get_or_insert_with(Sheet::create);

        let offset = sheet.locate(target)?;
        sheet.rows[offset].1 = values;
        Ok(())
    }

    async fn remove(&self, target: RowRef) -> Result<()> {
        let mut guard = self.sheet.write().await;
        let sheet = guard.get_or_insert_with(Sheet::create);

        let offset = sheet.locate(target)?;
        sheet.rows.remove(offset);
        Ok(())
    }
}
