//! Element value models and DTOs.

use cype_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `element_values` table. Values are opaque text whatever
/// the variable's kind.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ElementValue {
    pub id: DbId,
    pub project_element_id: DbId,
    pub variable_id: DbId,
    pub value: String,
    pub updated_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A stored value joined with its variable's definition.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ElementValueDetail {
    pub variable_id: DbId,
    pub variable_name: String,
    pub kind: String,
    pub unit: Option<String>,
    pub value: String,
    pub updated_by: Option<String>,
    pub updated_at: Timestamp,
}

/// Request body for assigning a value.
#[derive(Debug, Clone, Deserialize)]
pub struct SetElementValue {
    pub value: String,
    pub updated_by: Option<String>,
}
