use axum::{
    extract::{Json, Path, State},
    routing::get,
    Extension, Router,
};
use eventstay_shared::{Hotel, HotelWithRooms};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hotels", get(get_hotels))
        .route("/hotels/{hotel_id}", get(get_hotel_by_id))
}

/// GET /hotels
async fn get_hotels(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    let hotels = state.hotels.get_hotels(user.user_id).await?;
    Ok(Json(hotels))
}

/// GET /hotels/{hotel_id}
///
/// The id stays a raw string here; the service rejects a malformed one with 400.
async fn get_hotel_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(hotel_id): Path<String>,
) -> Result<Json<HotelWithRooms>, AppError> {
    let hotel = state.hotels.get_hotel_by_id(user.user_id, &hotel_id).await?;
    Ok(Json(hotel))
}
