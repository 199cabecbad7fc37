//! Board registry
//!
//! Owns `boards/{id}`: the owner, the member list (forward side of
//! `User::boards`) and the category list (record of which board a category
//! belongs to). A board is created active and deletion is terminal.

use super::{category_registry, user_directory};
use crate::error::{CriticsError, Result};
use crate::path::StorePath;
use crate::ports::Store;
use crate::unit_of_work::UnitOfWork;
use critics_types::{Board, IdSet};
use serde_json::{json, Map};
use std::sync::Arc;
use tracing::{debug, info};

pub struct BoardRegistry {
    store: Arc<dyn Store>,
}

impl BoardRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a board owned by `owner`, who becomes its first member.
    pub async fn create_board(&self, board_id: &str, name: &str, owner: &str) -> Result<Board> {
        let board_path = StorePath::board(board_id)?;
        let board = Board::new(name, owner);

        let mut uow = UnitOfWork::new(self.store.clone());
        user_directory::add_board_to_user(&mut uow, owner, board_id).await?;
        uow.set_as(&board_path, &board).await?;
        uow.commit().await?;

        info!("Board {} created for owner {}", board_id, owner);
        Ok(board)
    }

    /// Rename a board. An empty name leaves it unchanged.
    pub async fn edit_board_name(&self, board_id: &str, name: &str) -> Result<()> {
        let board_path = StorePath::board(board_id)?;

        let mut uow = UnitOfWork::new(self.store.clone());
        require_board(&mut uow, board_id).await?;

        let mut updates = Map::new();
        if !name.is_empty() {
            updates.insert("name".to_string(), json!(name));
        }
        uow.update(&board_path, updates).await?;
        uow.commit().await?;

        info!("Board {} name updated", board_id);
        Ok(())
    }

    pub async fn get_board_data(&self, board_id: &str) -> Result<Option<Board>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        uow.get_as(&StorePath::board(board_id)?).await
    }

    /// Add a member on both sides of the membership; returns the members.
    pub async fn add_user_to_board(&self, board_id: &str, user_id: &str) -> Result<IdSet> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let mut board = require_board(&mut uow, board_id).await?;

        if !board.members.insert(user_id) {
            return Err(CriticsError::Conflict(format!(
                "User {user_id} is already a member of board {board_id}."
            )));
        }
        uow.set_as(&StorePath::board_members(board_id)?, &board.members)
            .await?;
        user_directory::add_board_to_user(&mut uow, user_id, board_id).await?;
        uow.commit().await?;

        info!("User {} added to board {}", user_id, board_id);
        Ok(board.members)
    }

    pub async fn link_category_to_board(&self, board_id: &str, category_id: &str) -> Result<IdSet> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let categories = link_category_to_board(&mut uow, board_id, category_id).await?;
        uow.commit().await?;
        Ok(categories)
    }

    /// Unlink a category. Unlinking one that is not linked is a no-op.
    pub async fn unlink_category_from_board(
        &self,
        board_id: &str,
        category_id: &str,
    ) -> Result<IdSet> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let categories = unlink_category_from_board(&mut uow, board_id, category_id).await?;
        uow.commit().await?;
        Ok(categories)
    }

    /// Delete a board with everything under it. Only the owner may do this.
    pub async fn delete_board(&self, board_id: &str, user_id: &str) -> Result<()> {
        let mut uow = UnitOfWork::new(self.store.clone());
        delete_board(&mut uow, board_id, user_id).await?;
        uow.commit().await?;

        info!("Board {} deleted by {}", board_id, user_id);
        Ok(())
    }
}

pub(crate) async fn require_board(uow: &mut UnitOfWork, board_id: &str) -> Result<Board> {
    uow.get_as(&StorePath::board(board_id)?)
        .await?
        .ok_or_else(|| CriticsError::not_found(format!("Board {board_id} does not exist.")))
}

pub(crate) async fn link_category_to_board(
    uow: &mut UnitOfWork,
    board_id: &str,
    category_id: &str,
) -> Result<IdSet> {
    if !uow.exists(&StorePath::category(category_id)?).await? {
        return Err(CriticsError::not_found(format!(
            "Category {category_id} does not exist."
        )));
    }
    let mut board = require_board(uow, board_id).await?;

    if !board.categories.insert(category_id) {
        return Err(CriticsError::Conflict(format!(
            "Category {category_id} is already in board {board_id}."
        )));
    }
    uow.set_as(&StorePath::board_categories(board_id)?, &board.categories)
        .await?;

    info!("Category {} linked to board {}", category_id, board_id);
    Ok(board.categories)
}

pub(crate) async fn unlink_category_from_board(
    uow: &mut UnitOfWork,
    board_id: &str,
    category_id: &str,
) -> Result<IdSet> {
    let categories_path = StorePath::board_categories(board_id)?;
    let mut categories: IdSet = uow.get_as(&categories_path).await?.unwrap_or_default();

    if categories.remove(category_id) {
        uow.set_as(&categories_path, &categories).await?;
        info!("Category {} unlinked from board {}", category_id, board_id);
    } else {
        debug!("Category {} not linked to board {}", category_id, board_id);
    }
    Ok(categories)
}

/// Stage a board deletion: member back-references, then every category with
/// its restaurants, then the board record.
pub(crate) async fn delete_board(uow: &mut UnitOfWork, board_id: &str, user_id: &str) -> Result<()> {
    let board: Board = uow
        .get_as(&StorePath::board(board_id)?)
        .await?
        .ok_or_else(|| CriticsError::not_found(format!("Board {board_id} not found")))?;

    if !board.is_owner(user_id) {
        return Err(CriticsError::Forbidden(
            "Only the board owner can delete the board".to_string(),
        ));
    }

    for member in &board.members {
        user_directory::remove_board_from_user(uow, member, board_id).await?;
    }

    for category_id in &board.categories {
        category_registry::purge_category(uow, category_id).await?;
        unlink_category_from_board(uow, board_id, category_id).await?;
    }

    uow.remove(&StorePath::board(board_id)?).await
}
