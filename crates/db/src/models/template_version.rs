//! Template version models and DTOs.

use cype_core::error::CoreError;
use cype_core::types::{DbId, Timestamp};
use cype_core::workflow::TemplateState;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::approval::ApprovalRecord;
use crate::models::mapping::TemplateMapping;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `template_versions` table. `state` holds the persisted
/// wire code (`S0`..`S3`, `D`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateVersion {
    pub id: DbId,
    pub element_type_id: DbId,
    pub version_number: i32,
    pub template_text: String,
    pub state: String,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TemplateVersion {
    pub fn template_state(&self) -> Result<TemplateState, CoreError> {
        TemplateState::from_code(&self.state)
    }
}

/// A newly created draft with the mappings stored alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateVersionWithMappings {
    #[serde(flatten)]
    pub version: TemplateVersion,
    pub mappings: Vec<TemplateMapping>,
}

/// Result of an approve or reject action.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub version: TemplateVersion,
    pub record: ApprovalRecord,
    /// The previously active version this approval deactivated, if any.
    pub superseded_version_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateDraft {
    pub element_type_id: DbId,
    pub template_text: String,
    pub created_by: String,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveTemplate {
    pub approver: String,
    pub comment: Option<String>,
    /// State the caller last saw; the action fails if it has since moved.
    pub expected_state: Option<TemplateState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectTemplate {
    pub approver: String,
    pub reason: Option<String>,
    pub expected_state: Option<TemplateState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateTemplate {
    pub template_text: String,
}

/// Body of `POST /element-types/{id}/templates`; the element type comes
/// from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTemplateDraft {
    pub template_text: String,
    pub created_by: String,
}

impl SubmitTemplateDraft {
    pub fn into_draft(self, element_type_id: DbId) -> CreateTemplateDraft {
        CreateTemplateDraft {
            element_type_id,
            template_text: self.template_text,
            created_by: self.created_by,
        }
    }
}
