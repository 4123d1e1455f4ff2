//! Project element instance models and DTOs.

use cype_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `project_elements` table. `template_version_id` is the
/// version lock and never changes after insert.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectElement {
    pub id: DbId,
    pub project_id: DbId,
    pub element_type_id: DbId,
    pub template_version_id: DbId,
    pub instance_code: String,
    pub instance_name: Option<String>,
    pub location: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectElement {
    pub element_type_id: DbId,
    /// Version to lock onto. When omitted, the element type's active
    /// version is used.
    pub template_version_id: Option<DbId>,
    pub instance_code: String,
    pub instance_name: Option<String>,
    pub location: Option<String>,
    pub created_by: Option<String>,
}
