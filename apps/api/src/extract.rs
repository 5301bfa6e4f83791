//! Axum extractors whose rejections become `AppError::Validation`, so a
//! malformed path, query string or body still gets the JSON error envelope.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::Json;

use crate::errors::AppError;

#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
