//! Success envelope shared by every HTTP handler (section 4.F / 6):
//! `{statusCode, data, message, success}`. Errors use `AppError`'s own
//! envelope instead.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

pub fn ok<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: true,
        }),
    )
}
