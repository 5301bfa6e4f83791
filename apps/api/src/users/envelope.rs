use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::users::service::DataSource;

/// Successful response body: `{success, message, data?, count?, dataSource, ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    #[serde(skip)]
    status: StatusCode,
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    data_source: &'static str,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Envelope<()> {
    /// An envelope without a `data` payload.
    pub fn message(source: DataSource, message: impl Into<String>) -> Self {
        Envelope {
            status: StatusCode::OK,
            success: true,
            message: message.into(),
            data: None,
            count: None,
            data_source: source.label(),
            extra: Map::new(),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(source: DataSource, message: impl Into<String>, data: T) -> Self {
        Envelope {
            status: StatusCode::OK,
            success: true,
            message: message.into(),
            data: Some(data),
            count: None,
            data_source: source.label(),
            extra: Map::new(),
        }
    }

    pub fn created(source: DataSource, message: impl Into<String>, data: T) -> Self {
        Envelope {
            status: StatusCode::CREATED,
            ..Self::ok(source, message, data)
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Adds an operation-specific top-level key.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// A list envelope carrying `count` alongside the rows.
pub fn listing<T: Serialize>(
    source: DataSource,
    message: impl Into<String>,
    rows: Vec<T>,
) -> Envelope<Vec<T>> {
    let count = rows.len();
    Envelope::ok(source, message, rows).count(count)
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
