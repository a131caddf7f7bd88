//! HTTP helpers for the calendar Lambda.

use lambda_http::{Body, Response};
use serde::Serialize;

use crate::models::Event;

/// Response envelope. Every reply to GET/POST carries `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Bare acknowledgement.
    pub fn ok() -> Self {
        Self {
            success: true,
            events: None,
            event: None,
            error: None,
        }
    }

    pub fn listed(events: Vec<Event>) -> Self {
        Self {
            events: Some(events),
            ..Self::ok()
        }
    }

    pub fn added(event: Event) -> Self {
        Self {
            event: Some(event),
            ..Self::ok()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            events: None,
            event: None,
            error: Some(message.into()),
        }
    }
}

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<ApiResponse>,
}

impl Reply {
    pub fn json(status: u16, body: ApiResponse) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    let json = serde_json::to_string(data)?;
    Ok(with_cors(Response::builder().status(status))
        .header("Content-Type", "application/json")
        .body(Body::from(json))?)
}

/// Convert a dispatcher reply into the Lambda response.
pub fn into_response(reply: Reply) -> Result<Response<Body>, lambda_http::Error> {
    match reply.body {
        Some(body) => json_response(reply.status, &body),
        None => Ok(with_cors(Response::builder().status(reply.status)).body(Body::Empty)?),
    }
}

fn with_cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_shape() {
        let json = serde_json::to_string(&ApiResponse::error("Unknown action")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"Unknown action"}"#);
    }

    #[test]
    fn test_ok_shape() {
        let json = serde_json::to_string(&ApiResponse::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
        let json = serde_json::to_string(&ApiResponse::listed(Vec::new())).unwrap();
        assert_eq!(json, r#"{"success":true,"events":[]}"#);
    }

    #[test]
    fn test_json_response_headers() {
        let response = json_response(200, &ApiResponse::ok()).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_empty_reply() {
        let response = into_response(Reply::empty(204)).unwrap();
        assert_eq!(response.status(), 204);
        assert!(matches!(response.body(), Body::Empty));
    }
}
