use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use eventstay_api::{app, middleware::Claims, AppState, AuthConfig};
use eventstay_core::MemoryStore;
use eventstay_shared::TicketStatus;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    store: Arc<MemoryStore>,
    router: Router,
}

fn setup() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        AuthConfig {
            secret: SECRET.to_string(),
        },
    );

    TestApp {
        store,
        router: app(state),
    }
}

fn sign(user_id: i32) -> String {
    Claims::for_user(user_id, Utc::now() + Duration::hours(1))
        .encode(SECRET)
        .unwrap()
}

impl TestApp {
    /// Signs a token for `user_id` and opens a session for it.
    async fn login(&self, user_id: i32) -> String {
        let token = sign(user_id);
        self.store.add_session(user_id, &token).await;
        token
    }

    async fn eligible_user(&self, user_id: i32) -> String {
        self.store.add_ticket(user_id, TicketStatus::Paid, false, true).await;
        self.login(user_id).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = setup();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = setup();
    for (method, uri) in [
        (Method::GET, "/booking"),
        (Method::POST, "/booking"),
        (Method::PUT, "/booking/1"),
        (Method::GET, "/hotels"),
        (Method::GET, "/hotels/1"),
    ] {
        let (status, _) = app.send(method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = setup();
    let (status, body) = app.send(Method::GET, "/booking", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_token_without_session_is_unauthorized() {
    let app = setup();
    let token = sign(1);
    let (status, _) = app.send(Method::GET, "/booking", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let app = setup();
    let token = Claims::for_user(1, Utc::now() + Duration::hours(1))
        .encode("someone-elses-secret")
        .unwrap();
    app.store.add_session(1, &token).await;

    let (status, _) = app.send(Method::GET, "/booking", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// GET /booking
// ============================================================================

#[tokio::test]
async fn test_get_booking_not_found() {
    let app = setup();
    let token = app.login(1).await;

    let (status, _) = app.send(Method::GET, "/booking", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_booking_returns_room() {
    let app = setup();
    let token = app.login(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 2).await;
    let booking = app.store.insert_booking(1, room.id).await;

    let (status, body) = app.send(Method::GET, "/booking", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], booking.id);
    assert_eq!(body["Room"]["id"], room.id);
    assert_eq!(body["Room"]["hotelId"], hotel.id);
    assert_eq!(body["Room"]["capacity"], 2);
    assert!(body["Room"]["createdAt"].is_string());
}

// ============================================================================
// POST /booking
// ============================================================================

#[tokio::test]
async fn test_create_booking_invalid_body() {
    let app = setup();
    let token = app.eligible_user(1).await;

    let (status, _) = app
        .send(Method::POST, "/booking", Some(&token), Some(json!({ "roomId": "asdasd" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::POST, "/booking", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::POST, "/booking", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_forbidden_for_ineligible_tickets() {
    let app = setup();
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 3).await;

    app.store.add_ticket(1, TicketStatus::Reserved, false, true).await;
    app.store.add_ticket(2, TicketStatus::Paid, true, true).await;
    app.store.add_ticket(3, TicketStatus::Paid, false, false).await;

    for user_id in 1..=3 {
        let token = app.login(user_id).await;
        let (status, _) = app
            .send(Method::POST, "/booking", Some(&token), Some(json!({ "roomId": room.id })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "user {}", user_id);
    }
    assert_eq!(app.store.room_occupancy(room.id).await, 0);
}

#[tokio::test]
async fn test_create_booking_full_room() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 1).await;
    app.store.insert_booking(2, room.id).await;

    let (status, _) = app
        .send(Method::POST, "/booking", Some(&token), Some(json!({ "roomId": room.id })))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.room_occupancy(room.id).await, 1);
}

#[tokio::test]
async fn test_create_booking_unknown_room() {
    let app = setup();
    let token = app.eligible_user(1).await;

    let (status, _) = app
        .send(Method::POST, "/booking", Some(&token), Some(json!({ "roomId": 9999999 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_booking() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 2).await;

    let (status, body) = app
        .send(Method::POST, "/booking", Some(&token), Some(json!({ "roomId": room.id })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["bookingId"].is_i64());

    let (status, booking) = app.send(Method::GET, "/booking", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["id"], body["bookingId"]);
}

// ============================================================================
// PUT /booking/{bookingId}
// ============================================================================

#[tokio::test]
async fn test_update_booking_without_booking() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 2).await;

    let (status, _) = app
        .send(Method::PUT, "/booking/1", Some(&token), Some(json!({ "roomId": room.id })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_booking_into_full_room() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 1).await;
    let booking = app.store.insert_booking(1, room.id).await;

    let uri = format!("/booking/{}", booking.id);
    let (status, _) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "roomId": room.id })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_booking_invalid_id() {
    let app = setup();
    let token = app.eligible_user(1).await;

    let (status, _) = app
        .send(Method::PUT, "/booking/abc", Some(&token), Some(json!({ "roomId": 1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_booking_moves_room() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let from = app.store.add_room(hotel.id, "201", 1).await;
    let to = app.store.add_room(hotel.id, "202", 3).await;
    let booking = app.store.insert_booking(1, from.id).await;

    let uri = format!("/booking/{}", booking.id);
    let (status, body) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "roomId": to.id })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookingId"], booking.id);
    assert_eq!(app.store.room_occupancy(from.id).await, 0);
    assert_eq!(app.store.room_occupancy(to.id).await, 1);
}

#[tokio::test]
async fn test_update_someone_elses_booking() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let from = app.store.add_room(hotel.id, "201", 2).await;
    let to = app.store.add_room(hotel.id, "202", 2).await;
    app.store.insert_booking(1, from.id).await;
    let other = app.store.insert_booking(2, from.id).await;

    let uri = format!("/booking/{}", other.id);
    let (status, body) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "roomId": to.id })))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
    assert_eq!(app.store.room_occupancy(from.id).await, 2);
    assert_eq!(app.store.room_occupancy(to.id).await, 0);
}

// ============================================================================
// DELETE /booking/{bookingId}
// ============================================================================

#[tokio::test]
async fn test_cancel_booking() {
    let app = setup();
    let token = app.login(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 1).await;
    let booking = app.store.insert_booking(1, room.id).await;

    let uri = format!("/booking/{}", booking.id);
    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookingId"], booking.id);

    let (status, _) = app.send(Method::GET, "/booking", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.room_occupancy(room.id).await, 0);
}

#[tokio::test]
async fn test_cancel_someone_elses_booking() {
    let app = setup();
    let token = app.login(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 2).await;
    app.store.insert_booking(1, room.id).await;
    let other = app.store.insert_booking(2, room.id).await;

    let uri = format!("/booking/{}", other.id);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.room_occupancy(room.id).await, 2);
}

// ============================================================================
// GET /hotels
// ============================================================================

#[tokio::test]
async fn test_get_hotels_without_ticket() {
    let app = setup();
    let token = app.login(1).await;
    app.store.add_hotel("Grand Hotel", "grand.png").await;

    let (status, _) = app.send(Method::GET, "/hotels", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_hotels_payment_required() {
    let app = setup();
    app.store.add_hotel("Grand Hotel", "grand.png").await;
    app.store.add_ticket(1, TicketStatus::Reserved, false, true).await;
    let token = app.login(1).await;

    let (status, _) = app.send(Method::GET, "/hotels", Some(&token), None).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_get_hotels_empty_catalog() {
    let app = setup();
    let token = app.eligible_user(1).await;

    let (status, _) = app.send(Method::GET, "/hotels", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_hotels() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;

    let (status, body) = app.send(Method::GET, "/hotels", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["id"], hotel.id);
    assert_eq!(body[0]["name"], "Grand Hotel");
    assert_eq!(body[0]["image"], "grand.png");
}

// ============================================================================
// GET /hotels/{hotelId}
// ============================================================================

#[tokio::test]
async fn test_get_hotel_by_id_invalid_id() {
    let app = setup();
    // no ticket: the id format is checked first
    let token = app.login(1).await;

    let (status, _) = app.send(Method::GET, "/hotels/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_hotel_by_id_unknown_hotel() {
    let app = setup();
    let token = app.eligible_user(1).await;

    let (status, _) = app.send(Method::GET, "/hotels/9999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_hotel_by_id_out_of_range_id() {
    let app = setup();
    let token = app.eligible_user(1).await;

    let (status, _) = app.send(Method::GET, "/hotels/99999999999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_hotel_by_id_payment_required() {
    let app = setup();
    app.store.add_ticket(1, TicketStatus::Paid, true, true).await;
    let token = app.login(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;

    let uri = format!("/hotels/{}", hotel.id);
    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_get_hotel_by_id_with_rooms() {
    let app = setup();
    let token = app.eligible_user(1).await;
    let hotel = app.store.add_hotel("Grand Hotel", "grand.png").await;
    let room = app.store.add_room(hotel.id, "201", 2).await;

    let uri = format!("/hotels/{}", hotel.id);
    let (status, body) = app.send(Method::GET, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], hotel.id);
    assert_eq!(body["Rooms"][0]["id"], room.id);
    assert_eq!(body["Rooms"][0]["name"], "201");
}
