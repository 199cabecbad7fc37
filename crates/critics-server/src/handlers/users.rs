//! User handlers

use super::{given, ApiResult, Payload};
use crate::error::ApiError;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    username: Option<String>,
    user_id: Option<String>,
    boards: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBoardsRequest {
    user_id: Option<String>,
    boards: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBoardRequest {
    user_id: Option<String>,
    board_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCodeRequest {
    user_id: Option<String>,
    board_code: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Payload<CreateUserRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(username), Some(user_id)) = (given(&req.username), given(&req.user_id)) else {
        return Err(ApiError::bad_request("Username and userId are required"));
    };

    let user = state
        .registries
        .users
        .create_user(username, user_id, req.boards.unwrap_or_default())
        .await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

pub async fn get_user(State(state): State<AppState>, payload: Payload<UserRequest>) -> ApiResult {
    let Json(req) = payload?;
    let user_id = given(&req.user_id).ok_or_else(|| ApiError::bad_request("userId is required"))?;

    match state.registries.users.get_user(user_id).await? {
        Some(user) => Ok(Json(json!({ "success": true, "user": user }))),
        None => Err(ApiError::not_found("User not found")),
    }
}

pub async fn get_user_boards(
    State(state): State<AppState>,
    payload: Payload<UserRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let user_id = given(&req.user_id).ok_or_else(|| ApiError::bad_request("userId is required"))?;

    let boards = state.registries.users.get_user_boards(user_id).await?;
    Ok(Json(json!({ "success": true, "boards": boards })))
}

pub async fn update_user_boards(
    State(state): State<AppState>,
    payload: Payload<UpdateUserBoardsRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(user_id), Some(boards @ Value::Array(_))) = (given(&req.user_id), req.boards) else {
        return Err(ApiError::bad_request("userId and boards array are required"));
    };
    let boards: Vec<String> = serde_json::from_value(boards)
        .map_err(|_| ApiError::bad_request("boards must be an array of strings"))?;

    let boards = state
        .registries
        .users
        .update_user_boards(user_id, boards)
        .await?;
    Ok(Json(json!({ "success": true, "boards": boards })))
}

pub async fn delete_user(State(state): State<AppState>, payload: Payload<UserRequest>) -> ApiResult {
    let Json(req) = payload?;
    let user_id = given(&req.user_id).ok_or_else(|| ApiError::bad_request("userId is required"))?;

    state.registries.users.delete_user(user_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}

pub async fn remove_user_from_board(
    State(state): State<AppState>,
    payload: Payload<UserBoardRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(user_id), Some(board_id)) = (given(&req.user_id), given(&req.board_id)) else {
        return Err(ApiError::bad_request("userId and boardId are required"));
    };

    state
        .registries
        .users
        .remove_user_from_board(board_id, user_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "User removed from board successfully",
    })))
}

pub async fn add_board_to_user(
    State(state): State<AppState>,
    payload: Payload<BoardCodeRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(user_id), Some(board_code)) = (given(&req.user_id), given(&req.board_code)) else {
        return Err(ApiError::bad_request("userId and boardCode are required"));
    };

    let boards = state
        .registries
        .users
        .add_board_to_user(user_id, board_code)
        .await?;
    Ok(Json(json!({ "success": true, "boards": boards })))
}

pub async fn remove_board_from_user(
    State(state): State<AppState>,
    payload: Payload<BoardCodeRequest>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(user_id), Some(board_code)) = (given(&req.user_id), given(&req.board_code)) else {
        return Err(ApiError::bad_request("userId and boardCode are required"));
    };

    let boards = state
        .registries
        .users
        .remove_board_from_user(user_id, board_code)
        .await?;
    Ok(Json(json!({ "success": true, "boards": boards })))
}
