//! Category handlers

use super::{given, ApiResult, Payload};
use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    category_id: Option<String>,
    name: Option<String>,
    caption: Option<String>,
    board_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCategoryRequest {
    category_id: Option<String>,
    name: Option<String>,
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRestaurantRequest {
    category_id: Option<String>,
    restaurant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCategoryRequest {
    category_id: Option<String>,
    board_id: Option<String>,
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Payload<CreateCategoryRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(category_id), Some(name), Some(board_id)) =
        (given(&req.category_id), given(&req.name), given(&req.board_id))
    else {
        return Err(ApiError::bad_request(
            "categoryId, name, and boardId are required",
        ));
    };

    let category = state
        .registries
        .categories
        .create_category(
            category_id,
            name,
            req.caption.as_deref().unwrap_or_default(),
            board_id,
        )
        .await?;
    Ok(Json(json!({ "success": true, "category": category })))
}

pub async fn edit_category(
    State(state): State<AppState>,
    payload: Payload<EditCategoryRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let category_id =
        given(&req.category_id).ok_or_else(|| ApiError::bad_request("categoryId is required"))?;

    state
        .registries
        .categories
        .edit_category(category_id, req.name.as_deref(), req.caption.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Category {category_id} successfully updated"),
    })))
}

pub async fn get_category(
    State(state): State<AppState>,
    payload: Payload<CategoryRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let category_id =
        given(&req.category_id).ok_or_else(|| ApiError::bad_request("categoryId is required"))?;

    match state.registries.categories.get_category(category_id).await? {
        Some(category) => Ok(Json(json!({ "success": true, "category": category }))),
        None => Err(ApiError::not_found("Category not found")),
    }
}

pub async fn add_restaurant_to_category(
    State(state): State<AppState>,
    payload: Payload<CategoryRestaurantRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(category_id), Some(restaurant_id)) =
        (given(&req.category_id), given(&req.restaurant_id))
    else {
        return Err(ApiError::bad_request(
            "categoryId and restaurantId are required",
        ));
    };

    let restaurants = state
        .registries
        .categories
        .add_restaurant_to_category(category_id, restaurant_id)
        .await?;
    Ok(Json(json!({ "success": true, "restaurants": restaurants })))
}

pub async fn remove_restaurant_from_category(
    State(state): State<AppState>,
    payload: Payload<CategoryRestaurantRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(category_id), Some(restaurant_id)) =
        (given(&req.category_id), given(&req.restaurant_id))
    else {
        return Err(ApiError::bad_request(
            "categoryId and restaurantId are required",
        ));
    };

    let restaurants = state
        .registries
        .categories
        .remove_restaurant_from_category(category_id, restaurant_id)
        .await?;
    Ok(Json(json!({ "success": true, "restaurants": restaurants })))
}

pub async fn delete_category(
    State(state): State<AppState>,
    payload: Payload<DeleteCategoryRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(category_id), Some(board_id)) = (given(&req.category_id), given(&req.board_id))
    else {
        return Err(ApiError::bad_request("categoryId and boardId are required"));
    };

    state
        .registries
        .categories
        .delete_category(category_id, board_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Category {category_id} successfully deleted"),
    })))
}
