//! Request extractors that reject with `AppError`
//!
//! axum's own `Json`, `Query` and `Path` answer malformed input with a plain
//! text body (and 422 for JSON type mismatches). These wrappers route those
//! failures through `AppError` so every client error carries the same
//! bilingual JSON body and a 400 status.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path segments
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
