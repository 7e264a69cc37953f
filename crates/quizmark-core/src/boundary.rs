//! Transport-agnostic request/response boundary around the evaluation service.
//!
//! Mirrors an HTTP endpoint: `OPTIONS` answers the CORS preflight, `POST`
//! evaluates, and every response carries permissive CORS headers. The acting
//! user is read from a header and handed to the service explicitly.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{EvaluationError, ValidationError};
use crate::parser::{parse_evaluation_request, parse_evaluation_request_str};
use crate::service::EvaluationService;

pub const DEFAULT_USER_HEADER: &str = "x-user-id";
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type, x-user-id";

/// An incoming request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundaryRequest {
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Raw body text, or an already-decoded JSON object.
    #[serde(default)]
    pub body: Option<Value>,
}

impl BoundaryRequest {
    pub fn post(body: impl Into<Value>) -> Self {
        Self {
            method: "POST".into(),
            headers: BTreeMap::new(),
            body: Some(body.into()),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An outgoing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl BoundaryResponse {
    fn with_content_type(status: u16, content_type: &str, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            CORS_ALLOW_ORIGIN.to_string(),
        );
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            CORS_ALLOW_HEADERS.to_string(),
        );
        headers.insert("Content-Type".to_string(), content_type.to_string());
        Self {
            status,
            headers,
            body,
        }
    }

    fn json(status: u16, body: &impl Serialize) -> Self {
        let text = serde_json::to_string(body)
            .unwrap_or_else(|_| r#"{"error":"failed to encode response"}"#.to_string());
        Self::with_content_type(status, "application/json", text)
    }

    /// A 400 reply with `{"error": message}`.
    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::json(400, &json!({ "error": message.to_string() }))
    }

    fn preflight() -> Self {
        Self::with_content_type(200, "text/plain", "ok".to_string())
    }

    /// Decode the body as JSON.
    pub fn json_body(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Routes boundary requests into an [`EvaluationService`].
pub struct Boundary {
    service: Arc<EvaluationService>,
    user_header: String,
}

impl Boundary {
    pub fn new(service: Arc<EvaluationService>) -> Self {
        Self {
            service,
            user_header: DEFAULT_USER_HEADER.to_string(),
        }
    }

    /// Read the acting user from a different header.
    pub fn with_user_header(mut self, name: impl Into<String>) -> Self {
        self.user_header = name.into();
        self
    }

    pub async fn handle(&self, request: &BoundaryRequest) -> BoundaryResponse {
        match request.method.to_ascii_uppercase().as_str() {
            "OPTIONS" => BoundaryResponse::preflight(),
            "POST" => self.evaluate(request).await,
            other => {
                tracing::debug!("rejecting {other} request");
                BoundaryResponse::json(405, &json!({ "error": "method not allowed" }))
            }
        }
    }

    async fn evaluate(&self, request: &BoundaryRequest) -> BoundaryResponse {
        let parsed = match &request.body {
            Some(Value::String(text)) => parse_evaluation_request_str(text),
            Some(value) => parse_evaluation_request(value),
            None => Err(ValidationError::MalformedBody("empty body".into())),
        };
        let evaluation = match parsed {
            Ok(evaluation) => evaluation,
            Err(e) => return reject(&e),
        };

        let Some(user_id) = request
            .header(&self.user_header)
            .map(str::trim)
            .filter(|user| !user.is_empty())
        else {
            return reject(&ValidationError::MissingUser(self.user_header.clone()));
        };

        match self.service.evaluate_submission(&evaluation, user_id).await {
            Ok(result) => BoundaryResponse::json(200, &result),
            Err(e) => error_response(&e),
        }
    }
}

fn reject(error: &ValidationError) -> BoundaryResponse {
    tracing::warn!("rejected evaluation request: {error}");
    BoundaryResponse::bad_request(error)
}

fn error_response(error: &EvaluationError) -> BoundaryResponse {
    match error {
        e if e.is_client_error() => BoundaryResponse::bad_request(e),
        EvaluationError::Lookup { source, .. } => {
            tracing::error!("{error}");
            BoundaryResponse::json(
                500,
                &json!({ "error": "Failed to fetch question", "details": source.to_string() }),
            )
        }
        e => {
            tracing::error!("evaluation failed: {e}");
            BoundaryResponse::json(
                500,
                &json!({ "error": "Internal server error", "details": e.to_string() }),
            )
        }
    }
}
