//! Rendered description cache models.

use cype_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `rendered_descriptions` cache.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RenderedDescription {
    pub project_element_id: DbId,
    pub rendered_text: String,
    pub is_stale: bool,
    pub rendered_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Output of a fresh render.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    pub project_element_id: DbId,
    pub template_version_id: DbId,
    pub text: String,
    /// Placeholders left in `text` because their variable has no value.
    pub unresolved: Vec<String>,
    pub rendered_at: Timestamp,
}
