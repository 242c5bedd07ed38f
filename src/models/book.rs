//! Book domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub description: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 512))]
    pub title: String,

    #[validate(length(min = 1, max = 256))]
    pub author: String,

    pub isbn: String,
    pub description: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
}

/// Book patch with optional fields
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub genre: Option<String>,
    pub cover_image: Option<String>,
}
