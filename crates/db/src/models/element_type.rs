//! Element type models and DTOs.

use cype_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `element_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ElementType {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateElementType {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub created_by: Option<String>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Administrative changes: rename and unit price. The code is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateElementType {
    pub name: Option<String>,
    pub price: Option<f64>,
}
