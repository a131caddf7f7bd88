//! Calendar events service.
//!
//! CRUD over a row-oriented table of calendar events, served from a single
//! Lambda HTTP endpoint.

pub mod config;
pub mod date;
pub mod db;
pub mod error;
pub mod handler;
pub mod http;
pub mod models;
pub mod service;
pub mod table;

pub use config::{Backend, Config};
pub use error::{Error, Result};
pub use handler::handle_request;
pub use models::{Event, EventInput};
pub use service::EventService;
pub use table::{EventTable, MemoryTable, PgTable, RowRef};
