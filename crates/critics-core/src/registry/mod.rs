//! Registries owning each level of the user → board → category → restaurant
//! hierarchy
//!
//! Every public operation runs in one [`UnitOfWork`](crate::UnitOfWork), so a
//! cascade either lands completely or not at all. The crate-level functions in
//! each module are the cascade steps; they stage writes on a caller's unit and
//! are how one registry reaches into another.

pub mod board_registry;
pub mod category_registry;
pub mod restaurant_registry;
pub mod user_directory;

pub use board_registry::BoardRegistry;
pub use category_registry::CategoryRegistry;
pub use restaurant_registry::RestaurantRegistry;
pub use user_directory::UserDirectory;

use crate::ports::Store;
use std::sync::Arc;

/// All four registries over one store
#[derive(Clone)]
pub struct Registries {
    pub users: Arc<UserDirectory>,
    pub boards: Arc<BoardRegistry>,
    pub categories: Arc<CategoryRegistry>,
    pub restaurants: Arc<RestaurantRegistry>,
}

impl Registries {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            users: Arc::new(UserDirectory::new(store.clone())),
            boards: Arc::new(BoardRegistry::new(store.clone())),
            categories: Arc::new(CategoryRegistry::new(store.clone())),
            restaurants: Arc::new(RestaurantRegistry::new(store)),
        }
    }
}
