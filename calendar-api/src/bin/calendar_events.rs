//! Calendar Events Lambda - list, add, update and delete calendar events.
//!
//! Endpoints:
//! - GET / - List events
//! - POST / - `{"action": "add" | "update" | "delete", ...}`

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::into_response;
use shared::{handle_request, Backend, Config, EventService, EventTable, MemoryTable, PgTable};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    service: EventService,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;

        let table: Arc<dyn EventTable> = match (config.backend, &config.database) {
            (Backend::Postgres, Some(db)) => {
                let pool = shared::db::create_pool(db).await?;
                Arc::new(PgTable::new(pool, &config.table_name)?)
            }
            (Backend::Postgres, None) => return Err("Postgres backend needs database settings".into()),
            (Backend::Memory, _) => Arc::new(MemoryTable::new()),
        };

        info!(
            "Calendar events service ready: backend={:?}, table={}",
            config.backend, config.table_name
        );

        Ok(Self {
            service: EventService::new(table),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let reply = handle_request(&state.service, event.method(), event.body().as_ref()).await;
    into_response(reply)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
