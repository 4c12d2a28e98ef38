use axum::{
    extract::{Json, Path, State},
    routing::{get, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use eventstay_shared::BookingWithRoom;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub room_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingIdResponse {
    pub booking_id: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/booking", get(get_booking).post(create_booking))
        .route("/booking/{booking_id}", put(update_booking).delete(cancel_booking))
}

/// GET /booking
async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<BookingWithRoom>, AppError> {
    let booking = state.bookings.get_booking(user.user_id).await?;
    Ok(Json(booking))
}

/// POST /booking
async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(req), _): WithRejection<Json<BookingRequest>, AppError>,
) -> Result<Json<BookingIdResponse>, AppError> {
    let booking = state.bookings.create_booking(user.user_id, req.room_id).await?;
    Ok(Json(BookingIdResponse { booking_id: booking.id }))
}

/// PUT /booking/{booking_id}
async fn update_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(booking_id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<BookingRequest>, AppError>,
) -> Result<Json<BookingIdResponse>, AppError> {
    let booking = state
        .bookings
        .update_booking(user.user_id, booking_id, req.room_id)
        .await?;
    Ok(Json(BookingIdResponse { booking_id: booking.id }))
}

/// DELETE /booking/{booking_id}
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(booking_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<Json<BookingIdResponse>, AppError> {
    let booking_id = state.bookings.cancel_booking(user.user_id, booking_id).await?;
    Ok(Json(BookingIdResponse { booking_id }))
}
