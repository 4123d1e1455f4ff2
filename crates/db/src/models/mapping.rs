//! Placeholder mapping models.

use cype_core::rendering::PlaceholderBinding;
use cype_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `template_mappings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateMapping {
    pub id: DbId,
    pub template_version_id: DbId,
    pub variable_id: DbId,
    pub placeholder: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&TemplateMapping> for PlaceholderBinding {
    fn from(mapping: &TemplateMapping) -> Self {
        PlaceholderBinding {
            placeholder: mapping.placeholder.clone(),
            variable_id: mapping.variable_id,
        }
    }
}

/// A mapping joined with the variable it points at.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MappingDetail {
    pub placeholder: String,
    pub position: i32,
    pub variable_id: DbId,
    pub variable_name: String,
    pub kind: String,
    pub unit: Option<String>,
    pub is_required: bool,
}
