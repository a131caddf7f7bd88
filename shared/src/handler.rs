//! Request dispatch for the calendar endpoint.
//!
//! - GET - list events
//! - POST `{"action": "add", "event": {...}}` - add an event
//! - POST `{"action": "update", "rowIndex": n | "id": "...", "event": {...}}` - overwrite an event
//! - POST `{"action": "delete", "rowIndex": n | "id": "..."}` - delete an event
//!
//! Failures become `{"success": false, "error": "..."}` with status 200.

use lambda_http::http::Method;
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::http::{ApiResponse, Reply};
use crate::models::EventInput;
use crate::service::EventService;
use crate::table::RowRef;
use crate::{Error, Result};

/// POST body. Fields are parsed only once the action is known.
#[derive(Debug)]
struct ActionRequest {
    action: Option<Value>,
    event: Option<Value>,
    row_index: Option<Value>,
    id: Option<Value>,
}

impl ActionRequest {
    /// Pick the known fields out of a JSON object. `null` counts as absent.
    fn from_object(mut object: Map<String, Value>) -> Self {
        let mut field = |name: &str| object.remove(name).filter(|v| !v.is_null());
        Self {
            action: field("action"),
            event: field("event"),
            row_index: field("rowIndex"),
            id: field("id"),
        }
    }

    fn event(&mut self) -> Result<EventInput> {
        let event = self.event.take().ok_or(Error::MissingField("event"))?;
        serde_json::from_value(event).map_err(|e| Error::InvalidRequest(format!("event: {}", e)))
    }

    /// `id` wins over `rowIndex` when both are sent.
    fn target(&self) -> Result<RowRef> {
        if let Some(id) = &self.id {
            let id = id
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| Error::InvalidRequest(format!("id is not a UUID: {}", id)))?;
            return Ok(RowRef::Id(id));
        }

        let row_index = self.row_index.as_ref().ok_or(Error::MissingField("rowIndex"))?;
        parse_row_index(row_index).map(RowRef::Position)
    }
}

fn parse_row_index(value: &Value) -> Result<i64> {
    let invalid = || Error::InvalidRequest(format!("rowIndex is not an integer: {}", value));

    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(invalid()),
    }
}

/// Handle one request. Never fails: every error is folded into the reply body.
pub async fn handle_request(service: &EventService, method: &Method, body: &[u8]) -> Reply {
    info!("Calendar request: {}", method);

    let outcome = match *method {
        Method::GET => list(service).await,
        Method::POST => post(service, body).await,
        Method::OPTIONS => return Reply::empty(204),
        _ => {
            warn!("Rejected method {}", method);
            return Reply::json(405, ApiResponse::error("Method not allowed"));
        }
    };

    match outcome {
        Ok(response) => Reply::json(200, response),
        Err(e) => {
            error!("Calendar request failed: {}", e);
            Reply::json(200, ApiResponse::error(e.to_string()))
        }
    }
}

async fn list(service: &EventService) -> Result<ApiResponse> {
    let events = service.list().await?;
    Ok(ApiResponse::listed(events))
}

async fn post(service: &EventService, body: &[u8]) -> Result<ApiResponse> {
    let body: Value =
        serde_json::from_slice(body).map_err(|e| Error::InvalidRequest(e.to_string()))?;

    // Arrays and scalars carry no `action` field.
    let Value::Object(object) = body else {
        warn!("Non-object POST body");
        return Ok(ApiResponse::error("Unknown action"));
    };
    let mut request = ActionRequest::from_object(object);

    match request.action.as_ref().and_then(Value::as_str) {
        Some("add") => {
            let event = service.add(request.event()?).await?;
            Ok(ApiResponse::added(event))
        }
        Some("update") => {
            let target = request.target()?;
            service.update(target, request.event()?).await?;
            Ok(ApiResponse::ok())
        }
        Some("delete") => {
            service.delete(request.target()?).await?;
            Ok(ApiResponse::ok())
        }
        other => {
            warn!("Unknown action: {:?}", other);
            Ok(ApiResponse::error("Unknown action"))
        }
    }
}
