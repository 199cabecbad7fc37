use crate::config::{AuthSettings, Settings, StoreBackend, StoreSettings};
use crate::{build_router, AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use critics_core::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn settings(require_auth: bool) -> Settings {
    Settings {
        bind_address: "127.0.0.1:0".to_string(),
        store: StoreSettings {
            backend: StoreBackend::Memory,
            database_path: String::new(),
        },
        auth: AuthSettings {
            jwt_secret: Some("test-secret".to_string()),
            require_auth,
            token_cache_ttl_secs: 60,
        },
    }
}

fn app_with(require_auth: bool) -> (AppState, Router) {
    let state = AppState::new(Arc::new(MemoryStore::new()), settings(require_auth));
    let router = build_router(state.clone());
    (state, router)
}

fn app() -> Router {
    app_with(false).1
}

async fn call(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call_with(app, uri, body, None).await
}

async fn call_with(app: &Router, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn restaurant_data() -> Value {
    json!({
        "name": "Taqueria Uno",
        "rating_1": 8,
        "rating_2": 7.5,
        "rating_3": 9,
        "notes": "",
        "visits": [],
        "location": "Main St",
        "dishes": ["pastor"],
        "photo": ""
    })
}

/// u1 owns b1; c1 and c2 are in b1; r1 is in c1.
async fn seeded_app() -> Router {
    let app = app();
    let steps = [
        ("/createUser", json!({"username": "Ana", "userId": "u1"})),
        ("/createBoard", json!({"boardId": "b1", "name": "Lunch", "owner": "u1"})),
        (
            "/createCategory",
            json!({"categoryId": "c1", "name": "Tacos", "caption": "spicy", "boardId": "b1"}),
        ),
        (
            "/createCategory",
            json!({"categoryId": "c2", "name": "Ramen", "boardId": "b1"}),
        ),
        (
            "/createRestaurant",
            json!({"categoryId": "c1", "restaurantId": "r1", "data": restaurant_data()}),
        ),
    ];
    for (uri, body) in steps {
        let (status, body) = call(&app, uri, body).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
    }
    app
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_board_then_read_it_back() {
    let app = app();
    let (status, body) = call(
        &app,
        "/createBoard",
        json!({"boardId": "b1", "name": "Lunch", "owner": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) = call(&app, "/getBoardData", json!({"boardId": "b1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["board"],
        json!({"name": "Lunch", "categories": [], "members": ["u1"], "owner": "u1"})
    );

    let (_, body) = call(&app, "/getUserBoards", json!({"userId": "u1"})).await;
    assert_eq!(body["boards"], json!(["b1"]));
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let app = app();
    let (status, body) = call(&app, "/createBoard", json!({"boardId": "b1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "boardId, name, and owner are required");

    let (status, body) = call(&app, "/createUser", json!({"userId": "", "username": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and userId are required");

    let (status, body) = call(&app, "/editRating", json!({"restaurantId": "r1", "ratingNumber": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "restaurantId, ratingNumber, and ratingValue are required"
    );
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/getUserBoards")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_board_is_not_found() {
    let (status, body) = call(&app(), "/getBoardData", json!({"boardId": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Board not found");
}

#[tokio::test]
async fn duplicate_member_is_bad_request() {
    let app = seeded_app().await;
    let add = json!({"boardId": "b1", "userId": "u2"});

    let (status, _) = call(&app, "/addUserToBoard", add.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, "/addUserToBoard", add).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already a member"));

    let (_, body) = call(&app, "/getBoardData", json!({"boardId": "b1"})).await;
    assert_eq!(body["board"]["members"], json!(["u1", "u2"]));
}

#[tokio::test]
async fn non_owner_delete_is_forbidden() {
    let app = seeded_app().await;
    let (status, body) = call(&app, "/deleteBoard", json!({"boardId": "b1", "userId": "u2"})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("Only the board owner"));

    let (status, _) = call(&app, "/getBoardData", json!({"boardId": "b1"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn owner_delete_cascades() {
    let app = seeded_app().await;
    let (status, _) = call(&app, "/deleteBoard", json!({"boardId": "b1", "userId": "u1"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, "/getCategory", json!({"categoryId": "c1"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "/getRestaurant", json!({"restaurantId": "r1"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = call(&app, "/getUserBoards", json!({"userId": "u1"})).await;
    assert_eq!(body["boards"], json!([]));
}

#[tokio::test]
async fn switch_category_moves_restaurant() {
    let app = seeded_app().await;
    let (status, body) = call(
        &app,
        "/switchRestaurantCategory",
        json!({"restaurantId": "r1", "newCategoryId": "c2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurant"]["category_code"], "c2");

    let (_, c1) = call(&app, "/getCategory", json!({"categoryId": "c1"})).await;
    let (_, c2) = call(&app, "/getCategory", json!({"categoryId": "c2"})).await;
    assert_eq!(c1["category"]["restaurants"], json!([]));
    assert_eq!(c2["category"]["restaurants"], json!(["r1"]));
}

#[tokio::test]
async fn rating_validation_maps_to_bad_request() {
    let app = seeded_app().await;

    let (status, body) = call(
        &app,
        "/editRating",
        json!({"restaurantId": "r1", "ratingNumber": 4, "ratingValue": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "rating_number must be 1, 2, or 3");

    let (status, body) = call(
        &app,
        "/editRating",
        json!({"restaurantId": "r1", "ratingNumber": 2, "ratingValue": "ten"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "rating_value must be a number between 0 and 10");

    let (status, body) = call(
        &app,
        "/editRating",
        json!({"restaurantId": "r1", "ratingNumber": 2, "ratingValue": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["update"], json!({"rating_2": 10.0}));

    let (status, body) = call(
        &app,
        "/editRating",
        json!({"restaurantId": "r1", "ratingNumber": 3.0, "ratingValue": 6.5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["update"], json!({"rating_3": 6.5}));

    let (status, body) = call(
        &app,
        "/editRating",
        json!({"restaurantId": "r1", "ratingNumber": 1.5, "ratingValue": 6.5}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "rating_number must be 1, 2, or 3");
}

#[tokio::test]
async fn loose_fields_are_type_checked() {
    let app = seeded_app().await;

    let (status, body) = call(&app, "/editNotes", json!({"restaurantId": "r1", "notes": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "notes must be a string");

    let (status, body) = call(
        &app,
        "/editDishRanking",
        json!({"restaurantId": "r1", "dishes": "pastor"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "dishes must be an array");

    let (status, body) = call(&app, "/editNotes", json!({"restaurantId": "r1", "notes": ""})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["update"], json!({"notes": ""}));
}

#[tokio::test]
async fn visits_and_dishes_round_trip_through_routes() {
    let app = seeded_app().await;

    let (_, body) = call(&app, "/addVisit", json!({"restaurantId": "r1", "visitDate": "2024-03-01"})).await;
    assert_eq!(body["visits"], json!(["2024-03-01"]));
    let (_, body) = call(&app, "/deleteVisit", json!({"restaurantId": "r1"})).await;
    assert_eq!(body["visits"], json!([]));

    let (_, body) = call(&app, "/addDish", json!({"restaurantId": "r1", "dish": "suadero"})).await;
    assert_eq!(body["dishes"], json!(["pastor", "suadero"]));

    let (status, body) = call(&app, "/deleteDish", json!({"restaurantId": "r1", "dish": "tripa"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Dish \"tripa\" not found in restaurant r1");
}

#[tokio::test]
async fn invalid_restaurant_data_is_bad_request() {
    let app = seeded_app().await;
    let mut data = restaurant_data();
    data["rating_1"] = json!(-1);

    let (status, body) = call(
        &app,
        "/createRestaurant",
        json!({"categoryId": "c1", "restaurantId": "r2", "data": data}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "rating_1 must be a number between 0 and 10");
}

#[tokio::test]
async fn verify_token_endpoint() {
    let (state, app) = app_with(false);
    let token = state
        .auth_service
        .issue_token("u1", Some("ana@example.com"), chrono::Duration::hours(1))
        .unwrap();

    let (status, body) = call(&app, "/verifyToken", json!({"idToken": token})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Token verified successfully", "uid": "u1", "email": "ana@example.com"})
    );

    let (status, body) = call(&app, "/verifyToken", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID token is required");

    let (status, body) = call(&app, "/verifyToken", json!({"idToken": "garbage"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn require_auth_guards_registry_routes() {
    let (state, app) = app_with(true);

    let (status, _) = call(&app, "/getUserBoards", json!({"userId": "u1"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = state
        .auth_service
        .issue_token("u1", None, chrono::Duration::hours(1))
        .unwrap();
    let (status, body) = call_with(&app, "/getUserBoards", json!({"userId": "u1"}), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["boards"], json!([]));

    // Health stays open.
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::OK);
}
