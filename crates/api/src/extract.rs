//! Request extractors whose rejections use the JSON error envelope.
//!
//! Drop-in replacements for axum's `Json`, `Query` and `Path`: a malformed
//! body, an unknown enum token in a query string or a non-numeric id is
//! answered with `400 BAD_REQUEST` as an [`AppError`] instead of axum's
//! plain-text rejection.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);
