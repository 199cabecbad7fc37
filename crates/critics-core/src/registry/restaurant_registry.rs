//! Restaurant registry
//!
//! Owns `restaurants/{id}`. `category_code` is the authoritative link to the
//! owning category and is kept in step with `Category::restaurants`.

use super::category_registry;
use crate::error::{CriticsError, Result};
use crate::path::StorePath;
use crate::ports::Store;
use crate::unit_of_work::UnitOfWork;
use critics_types::{rating_in_range, RatingSlot, Restaurant, REQUIRED_RESTAURANT_FIELDS};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RestaurantRegistry {
    store: Arc<dyn Store>,
}

impl RestaurantRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validate `data`, store it with `category_code` set, and list the
    /// restaurant under the category.
    pub async fn create_restaurant(
        &self,
        category_id: &str,
        restaurant_id: &str,
        data: &Value,
    ) -> Result<Restaurant> {
        let restaurant_path = StorePath::restaurant(restaurant_id)?;
        let restaurant = parse_restaurant(data, category_id)?;

        let mut uow = UnitOfWork::new(self.store.clone());

        // Re-creating an id replaces the record; drop the old listing first.
        let previous: Option<Restaurant> = uow.get_as(&restaurant_path).await?;
        if let Some(previous) = previous.filter(|p| !p.category_code.is_empty()) {
            match category_registry::remove_restaurant(
                &mut uow,
                &previous.category_code,
                restaurant_id,
            )
            .await
            {
                Ok(_) => {}
                Err(CriticsError::NotFound(_)) => warn!(
                    "Restaurant {} was not listed under {}",
                    restaurant_id, previous.category_code
                ),
                Err(e) => return Err(e),
            }
        }

        uow.set_as(&restaurant_path, &restaurant).await?;
        category_registry::add_restaurant(&mut uow, category_id, restaurant_id).await?;
        uow.commit().await?;

        info!("Restaurant {} created in category {}", restaurant_id, category_id);
        Ok(restaurant)
    }

    pub async fn get_restaurant(&self, restaurant_id: &str) -> Result<Option<Restaurant>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        uow.get_as(&StorePath::restaurant(restaurant_id)?).await
    }

    /// Set `rating_<rating_number>`; returns the written field.
    pub async fn edit_rating(
        &self,
        restaurant_id: &str,
        rating_number: i64,
        rating_value: f64,
    ) -> Result<Map<String, Value>> {
        let slot = RatingSlot::from_number(rating_number)
            .ok_or_else(|| CriticsError::validation("rating_number must be 1, 2, or 3"))?;
        if !rating_in_range(rating_value) {
            return Err(CriticsError::validation(
                "rating_value must be a number between 0 and 10",
            ));
        }

        let mut update = Map::new();
        update.insert(slot.field_name().to_string(), json!(rating_value));

        let mut uow = UnitOfWork::new(self.store.clone());
        require_restaurant(&mut uow, restaurant_id).await?;
        uow.update(&StorePath::restaurant(restaurant_id)?, update.clone())
            .await?;
        uow.commit().await?;

        info!("Rating {} updated for restaurant {}", slot, restaurant_id);
        Ok(update)
    }

    pub async fn edit_notes(&self, restaurant_id: &str, notes: &str) -> Result<Map<String, Value>> {
        let mut update = Map::new();
        update.insert("notes".to_string(), json!(notes));

        let mut uow = UnitOfWork::new(self.store.clone());
        require_restaurant(&mut uow, restaurant_id).await?;
        uow.update(&StorePath::restaurant(restaurant_id)?, update.clone())
            .await?;
        uow.commit().await?;

        info!("Notes updated for restaurant {}", restaurant_id);
        Ok(update)
    }

    /// Push a visit date; returns the visits.
    pub async fn add_visit(&self, restaurant_id: &str, visit_date: &str) -> Result<Vec<String>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let mut visits = require_restaurant(&mut uow, restaurant_id).await?.visits;

        visits.push(visit_date.to_string());
        uow.set_as(&StorePath::restaurant_visits(restaurant_id)?, &visits)
            .await?;
        uow.commit().await?;

        info!("Visit added to restaurant {}", restaurant_id);
        Ok(visits)
    }

    /// Pop the most recent visit. An empty list is left as is.
    pub async fn delete_visit(&self, restaurant_id: &str) -> Result<Vec<String>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let mut visits = require_restaurant(&mut uow, restaurant_id).await?.visits;

        if visits.pop().is_some() {
            uow.set_as(&StorePath::restaurant_visits(restaurant_id)?, &visits)
                .await?;
            uow.commit().await?;
            info!("Most recent visit deleted from restaurant {}", restaurant_id);
        } else {
            debug!("Restaurant {} has no visits to delete", restaurant_id);
        }
        Ok(visits)
    }

    /// Replace the ranked dish list.
    pub async fn edit_dish_ranking(
        &self,
        restaurant_id: &str,
        dishes: Vec<String>,
    ) -> Result<Vec<String>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        require_restaurant(&mut uow, restaurant_id).await?;
        uow.set_as(&StorePath::restaurant_dishes(restaurant_id)?, &dishes)
            .await?;
        uow.commit().await?;

        info!("Dishes updated for restaurant {}", restaurant_id);
        Ok(dishes)
    }

    pub async fn add_dish(&self, restaurant_id: &str, dish: &str) -> Result<Vec<String>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let mut dishes = require_restaurant(&mut uow, restaurant_id).await?.dishes;

        dishes.push(dish.to_string());
        uow.set_as(&StorePath::restaurant_dishes(restaurant_id)?, &dishes)
            .await?;
        uow.commit().await?;

        info!("Dish added to restaurant {}", restaurant_id);
        Ok(dishes)
    }

    /// Remove the first dish equal to `dish`.
    pub async fn delete_dish(&self, restaurant_id: &str, dish: &str) -> Result<Vec<String>> {
        let mut uow = UnitOfWork::new(self.store.clone());
        let mut dishes = require_restaurant(&mut uow, restaurant_id).await?.dishes;

        let index = dishes.iter().position(|d| d == dish).ok_or_else(|| {
            CriticsError::not_found(format!(
                "Dish \"{dish}\" not found in restaurant {restaurant_id}"
            ))
        })?;
        dishes.remove(index);
        uow.set_as(&StorePath::restaurant_dishes(restaurant_id)?, &dishes)
            .await?;
        uow.commit().await?;

        info!("Dish deleted from restaurant {}", restaurant_id);
        Ok(dishes)
    }

    /// Move a restaurant to `new_category_id`, relinking both categories.
    pub async fn switch_restaurant_category(
        &self,
        restaurant_id: &str,
        new_category_id: &str,
    ) -> Result<Restaurant> {
        let restaurant_path = StorePath::restaurant(restaurant_id)?;
        StorePath::category(new_category_id)?;

        let mut uow = UnitOfWork::new(self.store.clone());
        let mut restaurant = require_restaurant(&mut uow, restaurant_id).await?;
        category_registry::require_category(&mut uow, new_category_id, "does not exist.").await?;

        if restaurant.category_code == new_category_id {
            debug!(
                "Restaurant {} already in category {}",
                restaurant_id, new_category_id
            );
            return Ok(restaurant);
        }

        let old_category_id = std::mem::replace(
            &mut restaurant.category_code,
            new_category_id.to_string(),
        );
        uow.set_as(&restaurant_path, &restaurant).await?;
        if !old_category_id.is_empty() {
            category_registry::remove_restaurant(&mut uow, &old_category_id, restaurant_id)
                .await?;
        }
        category_registry::add_restaurant(&mut uow, new_category_id, restaurant_id).await?;
        uow.commit().await?;

        info!(
            "Restaurant {} moved from category {} to {}",
            restaurant_id, old_category_id, new_category_id
        );
        Ok(restaurant)
    }

    /// Delete a restaurant and its category listing. A missing record or
    /// category link skips the delisting.
    pub async fn delete_restaurant(&self, restaurant_id: &str) -> Result<()> {
        let restaurant_path = StorePath::restaurant(restaurant_id)?;

        let mut uow = UnitOfWork::new(self.store.clone());
        let restaurant: Option<Restaurant> = uow.get_as(&restaurant_path).await?;
        match restaurant {
            Some(r) if !r.category_code.is_empty() => {
                category_registry::remove_restaurant(&mut uow, &r.category_code, restaurant_id)
                    .await?;
            }
            _ => warn!("Restaurant {} has no category link to remove", restaurant_id),
        }
        uow.remove(&restaurant_path).await?;
        uow.commit().await?;

        info!("Restaurant {} deleted", restaurant_id);
        Ok(())
    }
}

async fn require_restaurant(uow: &mut UnitOfWork, restaurant_id: &str) -> Result<Restaurant> {
    uow.get_as(&StorePath::restaurant(restaurant_id)?)
        .await?
        .ok_or_else(|| CriticsError::not_found(format!("Restaurant {restaurant_id} not found")))
}

/// Check the nine required fields and their types, then build the record.
fn parse_restaurant(data: &Value, category_id: &str) -> Result<Restaurant> {
    StorePath::category(category_id)?;
    let fields = data
        .as_object()
        .ok_or_else(|| CriticsError::validation("Invalid restaurant data: must be an object"))?;

    for field in REQUIRED_RESTAURANT_FIELDS {
        if !fields.contains_key(field) {
            return Err(CriticsError::validation(format!(
                "Invalid restaurant data: missing required field `{field}`"
            )));
        }
    }

    let rating = |field: &str| -> Result<f64> {
        fields[field]
            .as_f64()
            .filter(|value| rating_in_range(*value))
            .ok_or_else(|| {
                CriticsError::validation(format!("{field} must be a number between 0 and 10"))
            })
    };
    let text = |field: &str| -> Result<String> {
        fields[field]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CriticsError::validation(format!("{field} must be a string")))
    };
    let list = |field: &str| -> Result<Vec<String>> {
        serde_json::from_value(fields[field].clone())
            .map_err(|_| CriticsError::validation(format!("{field} must be a list of strings")))
    };

    Ok(Restaurant {
        name: text("name")?,
        rating_1: rating("rating_1")?,
        rating_2: rating("rating_2")?,
        rating_3: rating("rating_3")?,
        notes: text("notes")?,
        visits: list("visits")?,
        location: text("location")?,
        dishes: list("dishes")?,
        photo: text("photo")?,
        category_code: category_id.to_string(),
    })
}
