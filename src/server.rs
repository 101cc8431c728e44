// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! REST API.
//!
//! ## Endpoints
//!
//! - `GET /bookings?search=&ordering=&limit=` - List bookings
//! - `POST /bookings` - Create a booking
//! - `GET /bookings/stats` - Dashboard statistics
//! - `GET /bookings/recent` - Bookings from the last 24 hours, as notifications
//! - `GET /bookings/export` - Booking list as CSV
//! - `GET /bookings/{reference}` - Get a booking by reference
//! - `PUT /bookings/{id}/status` - Change a booking's status
//! - `DELETE /bookings/{id}` - Delete a booking
//! - `GET /health` - Liveness check
//!
//! Every JSON response carries a `success` flag.
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:8000/bookings \
//!   -H "Content-Type: application/json" \
//!   -d '{"full_name": "Amal Perera", "email": "amal@example.com", "phone": "0771234567",
//!        "check_in": "2024-06-01", "check_out": "2024-06-03", "adults": 2,
//!        "selected_rooms": {"1": 2}, "total_price": "17000.00"}'
//!
//! curl -X PUT http://localhost:8000/bookings/1/status \
//!   -H "Content-Type: application/json" -d '{"status": "confirmed"}'
//! ```

use crate::access::AccessPolicy;
use crate::base::BookingId;
use crate::booking::{Booking, BookingRequest};
use crate::error::{BookingError, ValidationErrors};
use crate::export;
use crate::notification::Notifier;
use crate::query::{ListParams, ListQuery};
use crate::stats::BookingStats;
use crate::store::BookingStore;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

// === Request/Response DTOs ===

/// `{"success": true, "data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    fn with_message(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data,
        }
    }
}

/// Response body for a created booking.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: String,
    pub booking_reference: String,
    pub data: Booking,
}

/// Response body carrying only a message.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Response body for errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}

/// A polled "new booking" notification.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecentBooking {
    pub id: BookingId,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    pub booking_id: BookingId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub success: bool,
    pub status: String,
}

// === Application State ===

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BookingStore>,
    pub notifier: Arc<Notifier>,
    pub access: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(store: Arc<BookingStore>, notifier: Arc<Notifier>, access: AccessPolicy) -> Self {
        Self {
            store,
            notifier,
            access: Arc::new(access),
        }
    }
}

// === Error Handling ===

/// Wrapper for converting request failures into HTTP responses.
pub enum AppError {
    Booking(BookingError),
    /// Body or query string could not be parsed; `detail` goes under `non_field_errors`.
    Rejected {
        message: &'static str,
        detail: String,
    },
}

impl AppError {
    fn rejected(message: &'static str, detail: String) -> Self {
        AppError::Rejected { message, detail }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::rejected("Invalid request body.", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::rejected("Invalid query parameters.", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let err = match self {
            AppError::Booking(err) => err,
            AppError::Rejected { message, detail } => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    message.to_string(),
                    serde_json::to_value(ValidationErrors::non_field(detail)).ok(),
                );
            }
        };
        let (status, message, errors) = match err {
            BookingError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Invalid booking data.".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            BookingError::InvalidStatus(_) => {
                (StatusCode::BAD_REQUEST, "Invalid status".to_string(), None)
            }
            BookingError::InvalidOrdering(field) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid ordering field: {field}"),
                None,
            ),
            BookingError::NotFound => {
                (StatusCode::NOT_FOUND, "Booking not found.".to_string(), None)
            }
            BookingError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided or are invalid.".to_string(),
                None,
            ),
            err @ (BookingError::Persistence(_) | BookingError::ReferenceConflict(_)) => {
                error!(error = %err, "booking request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                    None,
                )
            }
        };

        error_response(status, message, errors)
    }
}

fn error_response(
    status: StatusCode,
    message: String,
    errors: Option<serde_json::Value>,
) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message,
            errors,
        }),
    )
        .into_response()
}

/// Path segments naming a booking id; anything else cannot exist.
fn parse_id(raw: &str) -> Result<BookingId, AppError> {
    raw.parse::<u64>()
        .map(BookingId)
        .map_err(|_| AppError::Booking(BookingError::NotFound))
}

// === Handlers ===

/// GET /bookings - List bookings.
async fn list_bookings(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<Booking>>>, AppError> {
    let Query(params) = params?;
    let query = ListQuery::try_from(params)?;
    Ok(Json(DataResponse::ok(state.store.list(&query))))
}

/// POST /bookings - Create a booking and notify the operator.
async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(request) =
        payload.map_err(|r| AppError::rejected("Invalid booking data.", r.body_text()))?;
    let booking = state.store.create(request)?;
    info!(reference = %booking.booking_reference, id = %booking.id, "new booking created");

    state.notifier.dispatch(booking.clone());

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            message: "Booking created successfully!".to_string(),
            booking_reference: booking.booking_reference.to_string(),
            data: booking,
        }),
    ))
}

/// GET /bookings/{reference} - Get a booking by reference.
async fn get_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<DataResponse<Booking>>, AppError> {
    let booking = state.store.get_by_reference(&reference)?;
    Ok(Json(DataResponse::ok(booking)))
}

/// PUT /bookings/{id}/status - Change a booking's status.
async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<DataResponse<Booking>>, AppError> {
    state.access.authorize(&headers)?;
    let id = parse_id(&id)?;
    let Json(update) = payload?;
    let status = update.status.unwrap_or_default();

    let booking = state.store.update_status(id, &status)?;
    info!(id = %id, status = %booking.status, "booking status updated");

    Ok(Json(DataResponse::with_message(
        "Booking status updated successfully",
        booking,
    )))
}

/// DELETE /bookings/{id} - Delete a booking.
async fn delete_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.access.authorize(&headers)?;
    let id = parse_id(&id)?;

    let booking = state.store.delete(id)?;
    info!(id = %id, reference = %booking.booking_reference, "booking deleted");

    Ok(Json(MessageResponse {
        success: true,
        message: "Booking deleted successfully".to_string(),
    }))
}

/// GET /bookings/stats - Dashboard statistics.
async fn booking_stats(State(state): State<AppState>) -> Json<DataResponse<BookingStats>> {
    Json(DataResponse::ok(state.store.stats()))
}

/// GET /bookings/recent - Recent bookings shaped as notifications.
async fn recent_bookings(State(state): State<AppState>) -> Json<DataResponse<Vec<RecentBooking>>> {
    let rooms = state.store.rooms();
    let recent = state
        .store
        .recent(Utc::now())
        .into_iter()
        .map(|booking| RecentBooking {
            id: booking.id,
            kind: "new_booking".to_string(),
            title: format!("New Booking: {}", booking.booking_reference),
            message: format!(
                "{} booked {} for {}",
                booking.full_name,
                rooms.summarize(&booking.selected_rooms),
                booking.check_in
            ),
            timestamp: booking.booking_date,
            read: false,
            booking_id: booking.id,
        })
        .collect();

    Json(DataResponse::ok(recent))
}

/// GET /bookings/export - Booking list as CSV.
async fn export_bookings(State(state): State<AppState>) -> Result<Response, AppError> {
    let bookings = state.store.list(&ListQuery::new());
    let mut body = Vec::new();
    export::write_bookings(&bookings, &mut body)
        .map_err(|e| BookingError::Persistence(format!("CSV export failed: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}

/// GET /health
async fn health() -> Json<Health> {
    Json(Health {
        success: true,
        status: "ok".to_string(),
    })
}

// === Router ===

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/stats", get(booking_stats))
        .route("/bookings/recent", get(recent_bookings))
        .route("/bookings/export", get(export_bookings))
        .route("/bookings/{key}", get(get_booking).delete(delete_booking))
        .route("/bookings/{key}/status", put(update_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: BookingError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn error_status_codes() {
        assert_eq!(
            status_of(BookingError::Validation(ValidationErrors::non_field("x"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BookingError::InvalidStatus("archived".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BookingError::InvalidOrdering("password".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(BookingError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(BookingError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(BookingError::Persistence("disk on fire".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rejections_are_bad_requests() {
        let response =
            AppError::rejected("Invalid query parameters.", "duplicate field".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_numeric_id_is_not_found() {
        assert!(parse_id("HHABCD1234").is_err());
        assert_eq!(parse_id("42").ok(), Some(BookingId(42)));
    }
}
