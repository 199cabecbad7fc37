//! Category registry

use super::board_registry;
use crate::error::{CriticsError, Result};
use crate::path::StorePath;
use crate::ports::Store;
use crate::unit_of_work::UnitOfWork;
use critics_types::Category;
use serde_json::{json, Map};
use std::sync::Arc;
use tracing::info;

pub struct CategoryRegistry {
    store: Arc<dyn Store>,
}

impl CategoryRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create an empty category and link it to `board_id`.
    pub async fn create_category(
        &self,
        category_id: &str,
        name: &str,
        caption: &str,
        board_id: &str,
    ) -> Result<Category> {
        let category_path = StorePath::category(category_id)?;
        let category = Category::new(name, caption);

        let mut uow = UnitOfWork::new(self.store.clone());
        uow.set_as(&category_path, &category).await?;
        board_registry::link_category_to_board(&mut uow, board_id, category_id).await?;
        uow.commit().await?;

        info!("Category {} created in board {}", category_id, board_id);
        Ok(category)
    }

    /// Update name and/or caption; empty values are left alone.
    pub async fn edit_category(
        &self,
        category_id: &str,
        name: Option<&str>,
        caption: Option<&str>,
    ) -> Result<()> {
        let category_path = StorePath::category(category_id)?;

        let mut uow = UnitOfWork::new(self.store.clone());
        require_category(&mut uow, category_id, "not found").await?;

        let mut updates = Map::new();
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            updates.insert("name".to_string(), json!(name));
        }
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            updates.insert("caption".to_string(), json!(caption));
        }
        uow.update(&category_path, updates).await?;
        uow.commit().await?;

        info!("Category {} updated", category_id);
        Ok(())
    }

    pub async fn get_category(&self, category_id: &str) -> Result<Option<Category>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        uow.get_as(&StorePath::category(category_id)?).await
    }

    /// Append a restaurant id. Duplicates are not checked.
    pub async fn add_restaurant_to_category(
        &self,
        category_id: &str,
        restaurant_id: &str,
    ) -> Result<Vec<String>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let restaurants = add_restaurant(&mut uow, category_id, restaurant_id).await?;
        uow.commit().await?;
        Ok(restaurants)
    }

    pub async fn remove_restaurant_from_category(
        &self,
        category_id: &str,
        restaurant_id: &str,
    ) -> Result<Vec<String>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let restaurants = remove_restaurant(&mut uow, category_id, restaurant_id).await?;
        uow.commit().await?;
        Ok(restaurants)
    }

    /// Delete the category's restaurants, unlink it from `board_id`, then
    /// delete the category.
    pub async fn delete_category(&self, category_id: &str, board_id: &str) -> Result<()> {
        let mut uow = UnitOfWork::new(self.store.clone());
        purge_restaurants(&mut uow, category_id).await?;
        board_registry::unlink_category_from_board(&mut uow, board_id, category_id).await?;
        uow.remove(&StorePath::category(category_id)?).await?;
        uow.commit().await?;

        info!("Category {} deleted from board {}", category_id, board_id);
        Ok(())
    }
}

/// `missing` completes the error text: "does not exist." or "not found".
pub(crate) async fn require_category(
    uow: &mut UnitOfWork,
    category_id: &str,
    missing: &str,
) -> Result<Category> {
    uow.get_as(&StorePath::category(category_id)?)
        .await?
        .ok_or_else(|| CriticsError::not_found(format!("Category {category_id} {missing}")))
}

async fn category_restaurants(uow: &mut UnitOfWork, category_id: &str) -> Result<Vec<String>> {
    Ok(uow
        .get_as(&StorePath::category_restaurants(category_id)?)
        .await?
        .unwrap_or_default())
}

pub(crate) async fn add_restaurant(
    uow: &mut UnitOfWork,
    category_id: &str,
    restaurant_id: &str,
) -> Result<Vec<String>> {
    let mut restaurants = require_category(uow, category_id, "does not exist.")
        .await?
        .restaurants;

    restaurants.push(restaurant_id.to_string());
    uow.set_as(&StorePath::category_restaurants(category_id)?, &restaurants)
        .await?;

    info!("Restaurant {} added to category {}", restaurant_id, category_id);
    Ok(restaurants)
}

/// Remove the first occurrence of `restaurant_id`.
pub(crate) async fn remove_restaurant(
    uow: &mut UnitOfWork,
    category_id: &str,
    restaurant_id: &str,
) -> Result<Vec<String>> {
    let mut restaurants = category_restaurants(uow, category_id).await?;

    let index = restaurants
        .iter()
        .position(|id| id == restaurant_id)
        .ok_or_else(|| {
            CriticsError::not_found(format!(
                "Restaurant {restaurant_id} not found in category {category_id}"
            ))
        })?;
    restaurants.remove(index);
    uow.set_as(&StorePath::category_restaurants(category_id)?, &restaurants)
        .await?;

    info!("Restaurant {} removed from category {}", restaurant_id, category_id);
    Ok(restaurants)
}

async fn purge_restaurants(uow: &mut UnitOfWork, category_id: &str) -> Result<()> {
    for restaurant_id in category_restaurants(uow, category_id).await? {
        uow.remove(&StorePath::restaurant(&restaurant_id)?).await?;
        info!("Restaurant {} deleted", restaurant_id);
    }
    Ok(())
}

/// Delete a category record and every restaurant it lists. Board links are
/// left to the caller.
pub(crate) async fn purge_category(uow: &mut UnitOfWork, category_id: &str) -> Result<()> {
    purge_restaurants(uow, category_id).await?;
    uow.remove(&StorePath::category(category_id)?).await
}
