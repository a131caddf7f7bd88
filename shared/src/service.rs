//! Event store service: list, add, update and delete over a backing table.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::models::{Event, EventInput};
use crate::table::{EventTable, RowRef};
use crate::Result;

/// CRUD over the events table. Writes through one service never interleave.
pub struct EventService {
    table: Arc<dyn EventTable>,
    writes: Mutex<()>,
}

impl EventService {
    pub fn new(table: Arc<dyn EventTable>) -> Self {
        Self {
            table,
            writes: Mutex::new(()),
        }
    }

    /// All present events in storage order, read fresh on every call.
    pub async fn list(&self) -> Result<Vec<Event>> {
        let rows = self.table.rows().await?;
        Ok(rows.iter().filter_map(Event::from_listed).collect())
    }

    /// Append an event and return it as stored, with its position and id.
    pub async fn add(&self, input: EventInput) -> Result<Event> {
        let _guard = self.writes.lock().await;

        let stored = self.table.append(input.into_row()).await?;
        info!("Added event {} at row {}", stored.id, stored.row_index);

        Ok(Event::from_written(&stored))
    }

    /// Replace every field of an existing event; omitted fields reset to defaults.
    pub async fn update(&self, target: RowRef, input: EventInput) -> Result<()> {
        let _guard = self.writes.lock().await;

        self.table.overwrite(target, input.into_row()).await?;
        info!("Updated event at {}", target);
        Ok(())
    }

    /// Remove an event. Events after it move up one position.
    pub async fn delete(&self, target: RowRef) -> Result<()> {
        let _guard = self.writes.lock().await;

        self.table.remove(target).await?;
        info!("Deleted event at {}", target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, MemoryTable, RowValues};
    use crate::Error;

    fn input(date: &str, title: &str, category: Option<&str>) -> EventInput {
        EventInput {
            date: Some(date.to_string()),
            title: Some(title.to_string()),
            category: category.map(str::to_string),
            ..EventInput::default()
        }
    }

    fn service_with(table: MemoryTable) -> (EventService, Arc<MemoryTable>) {
        let table = Arc::new(table);
        (EventService::new(table.clone()), table)
    }

    #[tokio::test]
    async fn test_add_then_list_on_empty_table() {
        let (service, _) = service_with(MemoryTable::new());

        let added = service
            .add(input("2026-02-03", "Progress Reports", Some("other")))
            .await
            .unwrap();
        assert_eq!(added.row_index, 2);

        let events = service.list().await.unwrap();
        assert_eq!(events, vec![added.clone()]);
        assert_eq!(events[0].time, None);
        assert_eq!(events[0].end_date, None);
    }

    #[tokio::test]
    async fn test_add_position_follows_existing_records() {
        let (service, _) = service_with(MemoryTable::new());
        for day in 1..=4 {
            service
                .add(input(&format!("2026-04-0{}", day), "x", None))
                .await
                .unwrap();
        }

        let present = service.list().await.unwrap().len() as i64;
        let added = service.add(input("2026-04-20", "Return", None)).await.unwrap();
        assert_eq!(added.row_index, present + 2);
    }

    #[tokio::test]
    async fn test_round_trip_applies_defaults() {
        let (service, _) = service_with(MemoryTable::new());

        let added = service
            .add(EventInput {
                date: Some("2026-05-25".to_string()),
                end_date: Some("2026-06-08".to_string()),
                title: Some("Final Exams".to_string()),
                ..EventInput::default()
            })
            .await
            .unwrap();

        let listed = &service.list().await.unwrap()[0];
        assert_eq!(listed, &added);
        assert_eq!(listed.end_date.as_deref(), Some("2026-06-08"));
        assert_eq!(listed.category, "other");
        assert_eq!(listed.time, None);
    }

    #[tokio::test]
    async fn test_list_skips_rows_without_date() {
        let (service, _) = service_with(MemoryTable::with_rows([
            RowValues {
                title: Cell::text("placeholder"),
                category: Cell::text("test"),
                ..RowValues::default()
            },
            RowValues {
                date: Cell::text("2026-02-05"),
                time: Cell::text("12:37 - 13:55"),
                title: Cell::text("GFL Test 1"),
                category: Cell::text("test"),
                ..RowValues::default()
            },
        ]));

        let events = service.list().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].row_index, 3);
        assert_eq!(events[0].time.as_deref(), Some("12:37 - 13:55"));
    }

    #[tokio::test]
    async fn test_update_is_total_overwrite() {
        let (service, _) = service_with(MemoryTable::new());
        let added = service
            .add(EventInput {
                date: Some("2026-02-11".to_string()),
                time: Some("12:37 - 13:55".to_string()),
                title: Some("Mathematics Test 3".to_string()),
                category: Some("test".to_string()),
                ..EventInput::default()
            })
            .await
            .unwrap();

        service
            .update(
                RowRef::Position(added.row_index),
                input("2026-02-12", "Mathematics Test 3 (moved)", None),
            )
            .await
            .unwrap();

        let events = service.list().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, "2026-02-12");
        assert_eq!(events[0].time, None);
        assert_eq!(events[0].category, "other");
        assert_eq!(events[0].id, added.id);
    }

    #[tokio::test]
    async fn test_delete_shifts_later_positions() {
        let (service, table) = service_with(MemoryTable::new());
        let a = service.add(input("2026-03-24", "a", None)).await.unwrap();
        let b = service.add(input("2026-03-25", "b", None)).await.unwrap();
        let c = service.add(input("2026-03-26", "c", None)).await.unwrap();

        service.delete(RowRef::Position(b.row_index)).await.unwrap();

        let events = service.list().await.unwrap();
        assert_eq!(table.row_count().await, 2);
        assert_eq!(events[0].id, a.id);
        assert_eq!(events[0].row_index, a.row_index);
        assert_eq!(events[1].id, c.id);
        assert_eq!(events[1].row_index, c.row_index - 1);
    }

    #[tokio::test]
    async fn test_delete_by_id_after_shift() {
        let (service, _) = service_with(MemoryTable::new());
        let a = service.add(input("2026-04-01", "a", None)).await.unwrap();
        let b = service.add(input("2026-04-03", "b", None)).await.unwrap();

        service.delete(RowRef::Position(a.row_index)).await.unwrap();
        // b's old position no longer holds a row; its id still does.
        assert!(matches!(
            service.delete(RowRef::Position(b.row_index)).await,
            Err(Error::RowOutOfRange { .. })
        ));
        service.delete(RowRef::Id(b.id)).await.unwrap();

        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_update_leaves_table_untouched() {
        let (service, table) = service_with(MemoryTable::new());
        service.add(input("2026-05-01", "Labour Day", Some("holiday"))).await.unwrap();

        let err = service
            .update(RowRef::Position(9), input("2026-05-02", "x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RowOutOfRange { row_index: 9, .. }));
        assert_eq!(table.row_count().await, 1);
        assert_eq!(service.list().await.unwrap()[0].title, "Labour Day");
    }

    #[tokio::test]
    async fn test_concurrent_adds_get_distinct_positions() {
        let (service, _) = service_with(MemoryTable::new());
        let service = Arc::new(service);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .add(input("2026-06-26", &format!("event {}", i), None))
                        .await
                        .unwrap()
                        .row_index
                })
            })
            .collect();

        let mut positions = Vec::new();
        for handle in handles {
            positions.push(handle.await.unwrap());
        }
        positions.sort_unstable();
        assert_eq!(positions, (2..18).collect::<Vec<i64>>());
    }
}
