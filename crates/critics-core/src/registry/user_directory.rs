//! User directory
//!
//! Owns `users/{id}` and each user's board list. The board list is the
//! back-reference of `Board::members`.

use super::board_registry;
use crate::error::{CriticsError, Result};
use crate::path::StorePath;
use crate::ports::Store;
use crate::unit_of_work::UnitOfWork;
use critics_types::{Board, IdSet, User};
use std::sync::Arc;
use tracing::{debug, info};

pub struct UserDirectory {
    store: Arc<dyn Store>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Write a user record, replacing any existing one at `user_id`.
    pub async fn create_user(&self, name: &str, user_id: &str, boards: Vec<String>) -> Result<User> {
        let user = User::new(name, IdSet::from(boards));

        let mut uow = UnitOfWork::new(self.store.clone());
        uow.set_as(&StorePath::user(user_id)?, &user).await?;
        uow.commit().await?;

        info!("User {} created", user_id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        uow.get_as(&StorePath::user(user_id)?).await
    }

    /// The user's board ids, empty when the user is absent.
    pub async fn get_user_boards(&self, user_id: &str) -> Result<IdSet> {
        let mut uow = UnitOfWork::new(self.store.clone());
        user_boards(&mut uow, user_id).await
    }

    /// Replace the board list wholesale. Keeping `Board::members` in step is
    /// the caller's job.
    pub async fn update_user_boards(&self, user_id: &str, boards: Vec<String>) -> Result<IdSet> {
        let boards = IdSet::from(boards);

        let mut uow = UnitOfWork::new(self.store.clone());
        uow.set_as(&StorePath::user_boards(user_id)?, &boards).await?;
        uow.commit().await?;

        info!("Boards updated for user {}", user_id);
        Ok(boards)
    }

    /// Add `board_code` to the user's boards if missing; returns the list.
    ///
    /// When the board exists the user also joins its members, so both sides
    /// of the membership agree.
    pub async fn add_board_to_user(&self, user_id: &str, board_code: &str) -> Result<IdSet> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let boards = add_board_to_user(&mut uow, user_id, board_code).await?;

        if uow.exists(&StorePath::board(board_code)?).await? {
            let members_path = StorePath::board_members(board_code)?;
            let mut members: IdSet = uow.get_as(&members_path).await?.unwrap_or_default();
            if members.insert(user_id) {
                uow.set_as(&members_path, &members).await?;
            }
        }

        if uow.is_empty() {
            debug!("Board {} already listed for user {}", board_code, user_id);
        }
        uow.commit().await?;
        Ok(boards)
    }

    /// Drop `board_code` from the user's boards if present; returns the list.
    ///
    /// When the board exists the user also leaves its members. The owner
    /// cannot leave this way.
    pub async fn remove_board_from_user(&self, user_id: &str, board_code: &str) -> Result<IdSet> {
        let mut uow = UnitOfWork::new(self.store.clone());
        if uow.exists(&StorePath::board(board_code)?).await? {
            remove_user_from_board(&mut uow, board_code, user_id).await?;
        } else {
            remove_board_from_user(&mut uow, user_id, board_code).await?;
        }
        let boards = user_boards(&mut uow, user_id).await?;
        uow.commit().await?;
        Ok(boards)
    }

    /// Take `user_id` out of the board's members. Absent members are a no-op.
    pub async fn remove_user_from_board(&self, board_id: &str, user_id: &str) -> Result<()> {
        let mut uow = UnitOfWork::new(self.store.clone());
        remove_user_from_board(&mut uow, board_id, user_id).await?;
        uow.commit().await
    }

    /// Delete a user. Boards the user owns are deleted with their full
    /// cascade; other boards just lose the user as a member.
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        let mut uow = UnitOfWork::new(self.store.clone());

        let boards = user_boards(&mut uow, user_id).await?;
        for board_id in &boards {
            let board: Option<Board> = uow.get_as(&StorePath::board(board_id)?).await?;
            match board {
                Some(board) if board.is_owner(user_id) => {
                    board_registry::delete_board(&mut uow, board_id, user_id).await?;
                }
                _ => remove_user_from_board(&mut uow, board_id, user_id).await?,
            }
        }

        uow.remove(&StorePath::user(user_id)?).await?;
        uow.commit().await?;

        info!("User {} deleted with {} board link(s)", user_id, boards.len());
        Ok(())
    }
}

pub(crate) async fn user_boards(uow: &mut UnitOfWork, user_id: &str) -> Result<IdSet> {
    Ok(uow
        .get_as(&StorePath::user_boards(user_id)?)
        .await?
        .unwrap_or_default())
}

pub(crate) async fn add_board_to_user(
    uow: &mut UnitOfWork,
    user_id: &str,
    board_code: &str,
) -> Result<IdSet> {
    let mut boards = user_boards(uow, user_id).await?;
    if boards.insert(board_code) {
        uow.set_as(&StorePath::user_boards(user_id)?, &boards).await?;
        info!("Board {} added to user {}", board_code, user_id);
    }
    Ok(boards)
}

pub(crate) async fn remove_board_from_user(
    uow: &mut UnitOfWork,
    user_id: &str,
    board_code: &str,
) -> Result<IdSet> {
    let mut boards = user_boards(uow, user_id).await?;
    if boards.remove(board_code) {
        uow.set_as(&StorePath::user_boards(user_id)?, &boards).await?;
        info!("Board {} removed from user {}", board_code, user_id);
    }
    Ok(boards)
}

/// Remove both sides of a membership. The owner cannot be removed this way.
pub(crate) async fn remove_user_from_board(
    uow: &mut UnitOfWork,
    board_id: &str,
    user_id: &str,
) -> Result<()> {
    let members_path = StorePath::board_members(board_id)?;
    let mut members: IdSet = uow.get_as(&members_path).await?.unwrap_or_default();

    if members.contains(user_id) {
        let owner: Option<String> = uow.get_as(&StorePath::board(board_id)?.child("owner")?).await?;
        if owner.as_deref() == Some(user_id) {
            return Err(CriticsError::validation(format!(
                "Board owner {user_id} must be a member of board {board_id}; delete the board instead"
            )));
        }

        members.remove(user_id);
        uow.set_as(&members_path, &members).await?;
        info!("User {} removed from board {}", user_id, board_id);
    } else {
        debug!("User {} is not a member of board {}", user_id, board_id);
    }

    remove_board_from_user(uow, user_id, board_id).await?;
    Ok(())
}
