//! PostgreSQL-backed events table.
//!
//! Storage order is insertion order (`seq`). Positions are computed at read
//! time, so removing a row shifts every later position down by one, exactly
//! like deleting a sheet row. Writes take a transaction-scoped advisory lock
//! keyed on the table name so concurrent Lambda instances apply them one at a
//! time.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use super::{data_offset, Cell, EventTable, RowRef, RowValues, StoredRow, FIRST_DATA_ROW};
use crate::config::validate_table_name;
use crate::{Error, Result};

/// One row as selected from the database.
#[derive(Debug, sqlx::FromRow)]
struct EventRecord {
    id: Uuid,
    event_date: String,
    event_time: String,
    end_date: String,
    title: String,
    category: String,
}

impl EventRecord {
    fn into_stored(self, row_index: i64) -> StoredRow {
        StoredRow {
            id: self.id,
            row_index,
            values: RowValues {
                date: Cell::text(self.event_date),
                time: Cell::text(self.event_time),
                end_date: Cell::text(self.end_date),
                title: Cell::text(self.title),
                category: Cell::text(self.category),
            },
        }
    }
}

/// SQL text for one table name.
#[derive(Debug, Clone)]
struct Statements {
    table: String,
    create: String,
    select_all: String,
    count: String,
    insert: String,
    update_at_offset: String,
    update_by_id: String,
    delete_at_offset: String,
    delete_by_id: String,
}

impl Statements {
    fn new(table: &str) -> Self {
        const COLUMNS: &str = "event_date = $2, event_time = $3, end_date = $4, \
                               title = $5, category = $6, updated_at = NOW()";
        let at_offset = format!(
            "seq = (SELECT seq FROM {t} ORDER BY seq OFFSET $1 LIMIT 1)",
            t = table
        );

        Self {
            table: table.to_string(),
            create: format!(
                r#"
                CREATE TABLE IF NOT EXISTS {t} (
                    seq BIGSERIAL PRIMARY KEY,
                    id UUID NOT NULL UNIQUE,
                    event_date TEXT NOT NULL DEFAULT '',
                    event_time TEXT NOT NULL DEFAULT '',
                    end_date TEXT NOT NULL DEFAULT '',
                    title TEXT NOT NULL DEFAULT '',
                    category TEXT NOT NULL DEFAULT '',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
                t = table
            ),
            select_all: format!(
                "SELECT id, event_date, event_time, end_date, title, category FROM {} ORDER BY seq",
                table
            ),
            count: format!("SELECT COUNT(*) FROM {}", table),
            insert: format!(
                "INSERT INTO {} (id, event_date, event_time, end_date, title, category) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
                table
            ),
            update_at_offset: format!("UPDATE {} SET {} WHERE {}", table, COLUMNS, at_offset),
            update_by_id: format!("UPDATE {} SET {} WHERE id = $1", table, COLUMNS),
            delete_at_offset: format!("DELETE FROM {} WHERE {}", table, at_offset),
            delete_by_id: format!("DELETE FROM {} WHERE id = $1", table),
        }
    }
}

/// Text stored for each logical column, in column order.
fn column_texts(values: &RowValues) -> [String; 5] {
    [
        values.date.to_string(),
        values.time.to_string(),
        values.end_date.to_string(),
        values.title.to_string(),
        values.category.to_string(),
    ]
}

/// Events table living in a PostgreSQL database.
pub struct PgTable {
    pool: PgPool,
    sql: Statements,
    created: OnceCell<()>,
}

impl PgTable {
    pub fn new(pool: PgPool, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        Ok(Self {
            pool,
            sql: Statements::new(table),
            created: OnceCell::new(),
        })
    }

    async fn ensure_table(&self) -> Result<()> {
        self.created
            .get_or_try_init(|| async {
                info!("Ensuring events table {} exists", self.sql.table);
                sqlx::query(&self.sql.create).execute(&self.pool).await?;
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }

    /// Open a write transaction holding the table's advisory lock.
    async fn begin_write(&self) -> Result<Transaction<'static, Postgres>> {
        self.ensure_table().await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&self.sql.table)
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    async fn data_rows(tx: &mut Transaction<'static, Postgres>, count_sql: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(count_sql).fetch_one(&mut **tx).await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Offset of a position inside the locked transaction, or the range error.
    async fn checked_offset(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        row_index: i64,
    ) -> Result<i64> {
        let rows = Self::data_rows(tx, &self.sql.count).await?;
        data_offset(row_index, rows)
            .map(|offset| offset as i64)
            .ok_or_else(|| Error::out_of_range(row_index, rows))
    }
}

#[async_trait]
impl EventTable for PgTable {
    async fn rows(&self) -> Result<Vec<StoredRow>> {
        self.ensure_table().await?;

        let records: Vec<EventRecord> = sqlx::query_as(&self.sql.select_all)
            .fetch_all(&self.pool)
            .await?;

        Ok(records
            .into_iter()
            .zip(FIRST_DATA_ROW..)
            .map(|(record, row_index)| record.into_stored(row_index))
            .collect())
    }

    async fn append(&self, values: RowValues) -> Result<StoredRow> {
        let mut tx = self.begin_write().await?;
        let rows = Self::data_rows(&mut tx, &self.sql.count).await?;

        let id = Uuid::new_v4();
        let [date, time, end_date, title, category] = column_texts(&values);
        sqlx::query(&self.sql.insert)
            .bind(id)
            .bind(date)
            .bind(time)
            .bind(end_date)
            .bind(title)
            .bind(category)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let row_index = rows as i64 + FIRST_DATA_ROW;
        debug!("Inserted event {} at row {}", id, row_index);

        Ok(StoredRow {
            id,
            row_index,
            values,
        })
    }

    async fn overwrite(&self, target: RowRef, values: RowValues) -> Result<()> {
        let mut tx = self.begin_write().await?;
        let [date, time, end_date, title, category] = column_texts(&values);

        let query = match target {
            RowRef::Position(row_index) => {
                let offset = self.checked_offset(&mut tx, row_index).await?;
                sqlx::query(&self.sql.update_at_offset).bind(offset)
            }
            RowRef::Id(id) => sqlx::query(&self.sql.update_by_id).bind(id),
        };

        let result = query
            .bind(date)
            .bind(time)
            .bind(end_date)
            .bind(title)
            .bind(category)
            .execute(&mut *tx)
            .await?;

        if let RowRef::Id(id) = target {
            if result.rows_affected() == 0 {
                return Err(Error::NotFound(id));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, target: RowRef) -> Result<()> {
        let mut tx = self.begin_write().await?;

        let result = match target {
            RowRef::Position(row_index) => {
                let offset = self.checked_offset(&mut tx, row_index).await?;
                sqlx::query(&self.sql.delete_at_offset)
                    .bind(offset)
                    .execute(&mut *tx)
                    .await?
            }
            RowRef::Id(id) => {
                sqlx::query(&self.sql.delete_by_id)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
            }
        };

        if let RowRef::Id(id) = target {
            if result.rows_affected() == 0 {
                return Err(Error::NotFound(id));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
