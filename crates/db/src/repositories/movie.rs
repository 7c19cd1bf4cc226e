//! Movie repository.

use std::sync::Arc;

use cineconnect_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};

use crate::entities::{Movie, movie};

/// Repository for movie lookups.
#[derive(Clone)]
pub struct MovieRepository {
    db: Arc<DatabaseConnection>,
}

impl MovieRepository {
    /// Create a new movie repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a movie by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<movie::Model>> {
        Movie::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a movie by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<movie::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::MovieNotFound(id.to_string()))
    }

    /// Create a new movie.
    pub async fn create(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
