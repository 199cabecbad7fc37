//! Restaurant handlers
//!
//! Fields whose type the client might get wrong are decoded as raw JSON and
//! checked here, so the error names the field.

use super::{given, given_value, ApiResult, Payload};
use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    category_id: Option<String>,
    restaurant_id: Option<String>,
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRequest {
    restaurant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRatingRequest {
    restaurant_id: Option<String>,
    rating_number: Option<Value>,
    rating_value: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditNotesRequest {
    restaurant_id: Option<String>,
    notes: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVisitRequest {
    restaurant_id: Option<String>,
    visit_date: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDishRankingRequest {
    restaurant_id: Option<String>,
    dishes: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishRequest {
    restaurant_id: Option<String>,
    dish: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchCategoryRequest {
    restaurant_id: Option<String>,
    new_category_id: Option<Value>,
}

fn string_field<'a>(value: &'a Value, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_str()
        .ok_or_else(|| ApiError::bad_request(format!("{field} must be a string")))
}

/// Integers, including floats such as `2.0` with no fractional part.
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            .map(|n| n as i64)
    })
}

fn require_restaurant_id(req: &Option<String>) -> Result<&str, ApiError> {
    given(req).ok_or_else(|| ApiError::bad_request("restaurantId is required"))
}

pub async fn create_restaurant(
    State(state): State<AppState>,
    payload: Payload<CreateRestaurantRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(category_id), Some(restaurant_id), Some(data)) =
        (given(&req.category_id), given(&req.restaurant_id), req.data.as_ref())
    else {
        return Err(ApiError::bad_request(
            "categoryId, restaurantId, and data object are required",
        ));
    };

    let restaurant = state
        .registries
        .restaurants
        .create_restaurant(category_id, restaurant_id, data)
        .await?;
    Ok(Json(json!({ "success": true, "restaurant": restaurant })))
}

pub async fn get_restaurant(
    State(state): State<AppState>,
    payload: Payload<RestaurantRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let restaurant_id = require_restaurant_id(&req.restaurant_id)?;

    match state.registries.restaurants.get_restaurant(restaurant_id).await? {
        Some(restaurant) => Ok(Json(json!({ "success": true, "restaurant": restaurant }))),
        None => Err(ApiError::not_found("Restaurant not found")),
    }
}

pub async fn edit_rating(
    State(state): State<AppState>,
    payload: Payload<EditRatingRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(restaurant_id), Some(rating_number), Some(rating_value)) = (
        given(&req.restaurant_id),
        req.rating_number.as_ref(),
        req.rating_value.as_ref(),
    ) else {
        return Err(ApiError::bad_request(
            "restaurantId, ratingNumber, and ratingValue are required",
        ));
    };

    let rating_number = whole_number(rating_number)
        .ok_or_else(|| ApiError::bad_request("rating_number must be 1, 2, or 3"))?;
    let rating_value = rating_value
        .as_f64()
        .ok_or_else(|| ApiError::bad_request("rating_value must be a number between 0 and 10"))?;

    let update = state
        .registries
        .restaurants
        .edit_rating(restaurant_id, rating_number, rating_value)
        .await?;
    Ok(Json(json!({ "success": true, "update": update })))
}

pub async fn edit_notes(
    State(state): State<AppState>,
    payload: Payload<EditNotesRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(restaurant_id), Some(notes)) = (given(&req.restaurant_id), req.notes.as_ref())
    else {
        return Err(ApiError::bad_request("restaurantId and notes are required"));
    };
    let notes = string_field(notes, "notes")?;

    let update = state
        .registries
        .restaurants
        .edit_notes(restaurant_id, notes)
        .await?;
    Ok(Json(json!({ "success": true, "update": update })))
}

pub async fn add_visit(
    State(state): State<AppState>,
    payload: Payload<AddVisitRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(restaurant_id), Some(visit_date)) =
        (given(&req.restaurant_id), given_value(&req.visit_date))
    else {
        return Err(ApiError::bad_request(
            "restaurantId and visitDate are required",
        ));
    };
    let visit_date = string_field(visit_date, "visit_date")?;

    let visits = state
        .registries
        .restaurants
        .add_visit(restaurant_id, visit_date)
        .await?;
    Ok(Json(json!({ "success": true, "visits": visits })))
}

pub async fn delete_visit(
    State(state): State<AppState>,
    payload: Payload<RestaurantRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let restaurant_id = require_restaurant_id(&req.restaurant_id)?;

    let visits = state
        .registries
        .restaurants
        .delete_visit(restaurant_id)
        .await?;
    Ok(Json(json!({ "success": true, "visits": visits })))
}

pub async fn edit_dish_ranking(
    State(state): State<AppState>,
    payload: Payload<EditDishRankingRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(restaurant_id), Some(dishes)) = (given(&req.restaurant_id), req.dishes) else {
        return Err(ApiError::bad_request("restaurantId and dishes are required"));
    };
    if !dishes.is_array() {
        return Err(ApiError::bad_request("dishes must be an array"));
    }
    let dishes: Vec<String> = serde_json::from_value(dishes)
        .map_err(|_| ApiError::bad_request("dishes must be an array of strings"))?;

    let dishes = state
        .registries
        .restaurants
        .edit_dish_ranking(restaurant_id, dishes)
        .await?;
    Ok(Json(json!({ "success": true, "dishes": dishes })))
}

pub async fn add_dish(State(state): State<AppState>, payload: Payload<DishRequest>) -> ApiResult {
    let Json(req) = payload?;
    let (Some(restaurant_id), Some(dish)) = (given(&req.restaurant_id), given_value(&req.dish))
    else {
        return Err(ApiError::bad_request("restaurantId and dish are required"));
    };
    let dish = string_field(dish, "dish")?;

    let dishes = state
        .registries
        .restaurants
        .add_dish(restaurant_id, dish)
        .await?;
    Ok(Json(json!({ "success": true, "dishes": dishes })))
}

pub async fn delete_dish(
    State(state): State<AppState>,
    payload: Payload<DishRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(restaurant_id), Some(dish)) = (given(&req.restaurant_id), given_value(&req.dish))
    else {
        return Err(ApiError::bad_request("restaurantId and dish are required"));
    };
    let dish = string_field(dish, "dish")?;

    let dishes = state
        .registries
        .restaurants
        .delete_dish(restaurant_id, dish)
        .await?;
    Ok(Json(json!({ "success": true, "dishes": dishes })))
}

pub async fn switch_restaurant_category(
    State(state): State<AppState>,
    payload: Payload<SwitchCategoryRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(restaurant_id), Some(new_category_id)) =
        (given(&req.restaurant_id), given_value(&req.new_category_id))
    else {
        return Err(ApiError::bad_request(
            "restaurantId and newCategoryId are required",
        ));
    };
    let new_category_id = string_field(new_category_id, "Category ID")?;

    let restaurant = state
        .registries
        .restaurants
        .switch_restaurant_category(restaurant_id, new_category_id)
        .await?;
    Ok(Json(json!({ "success": true, "restaurant": restaurant })))
}

pub async fn delete_restaurant(
    State(state): State<AppState>,
    payload: Payload<RestaurantRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let restaurant_id = require_restaurant_id(&req.restaurant_id)?;

    state
        .registries
        .restaurants
        .delete_restaurant(restaurant_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Restaurant {restaurant_id} successfully deleted"),
    })))
}
