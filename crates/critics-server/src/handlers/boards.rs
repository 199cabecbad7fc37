//! Board handlers

use super::{given, ApiResult, Payload};
use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    board_id: Option<String>,
    name: Option<String>,
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBoardNameRequest {
    board_id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRequest {
    board_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUserRequest {
    board_id: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCategoryRequest {
    board_id: Option<String>,
    category_id: Option<String>,
}

pub async fn create_board(
    State(state): State<AppState>,
    payload: Payload<CreateBoardRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(board_id), Some(name), Some(owner)) =
        (given(&req.board_id), given(&req.name), given(&req.owner))
    else {
        return Err(ApiError::bad_request("boardId, name, and owner are required"));
    };

    let board = state
        .registries
        .boards
        .create_board(board_id, name, owner)
        .await?;
    Ok(Json(json!({ "success": true, "board": board })))
}

pub async fn edit_board_name(
    State(state): State<AppState>,
    payload: Payload<EditBoardNameRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let board_id = given(&req.board_id).ok_or_else(|| ApiError::bad_request("boardId is required"))?;

    state
        .registries
        .boards
        .edit_board_name(board_id, req.name.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Board name updated successfully",
    })))
}

pub async fn get_board_data(
    State(state): State<AppState>,
    payload: Payload<BoardRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let board_id = given(&req.board_id).ok_or_else(|| ApiError::bad_request("boardId is required"))?;

    match state.registries.boards.get_board_data(board_id).await? {
        Some(board) => Ok(Json(json!({ "success": true, "board": board }))),
        None => Err(ApiError::not_found("Board not found")),
    }
}

pub async fn add_user_to_board(
    State(state): State<AppState>,
    payload: Payload<BoardUserRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(board_id), Some(user_id)) = (given(&req.board_id), given(&req.user_id)) else {
        return Err(ApiError::bad_request("boardId and userId are required"));
    };

    let members = state
        .registries
        .boards
        .add_user_to_board(board_id, user_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("User {user_id} successfully added to board {board_id}"),
        "members": members,
    })))
}

pub async fn link_category_to_board(
    State(state): State<AppState>,
    payload: Payload<BoardCategoryRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(board_id), Some(category_id)) = (given(&req.board_id), given(&req.category_id))
    else {
        return Err(ApiError::bad_request("boardId and categoryId are required"));
    };

    let categories = state
        .registries
        .boards
        .link_category_to_board(board_id, category_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Category {category_id} successfully linked to board {board_id}"),
        "categories": categories,
    })))
}

pub async fn unlink_category_from_board(
    State(state): State<AppState>,
    payload: Payload<BoardCategoryRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(board_id), Some(category_id)) = (given(&req.board_id), given(&req.category_id))
    else {
        return Err(ApiError::bad_request("boardId and categoryId are required"));
    };

    let categories = state
        .registries
        .boards
        .unlink_category_from_board(board_id, category_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Category {category_id} successfully unlinked from board {board_id}"),
        "categories": categories,
    })))
}

pub async fn delete_board(
    State(state): State<AppState>,
    payload: Payload<BoardUserRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(board_id), Some(user_id)) = (given(&req.board_id), given(&req.user_id)) else {
        return Err(ApiError::bad_request("boardId and userId are required"));
    };

    state.registries.boards.delete_board(board_id, user_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Board {board_id} successfully deleted"),
    })))
}
