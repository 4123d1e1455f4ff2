//! Shared query parameter types for API handlers.

use cype_core::types::DbId;
use serde::Deserialize;

/// `?category=` filter for element type listings.
#[derive(Debug, Deserialize)]
pub struct CategoryFilter {
    pub category: Option<String>,
}

/// `?element_type_id=` filter for the pending review queue.
#[derive(Debug, Deserialize)]
pub struct PendingFilter {
    pub element_type_id: Option<DbId>,
}

/// `?status=` filter for project listings (status name, e.g. `ACTIVE`).
#[derive(Debug, Deserialize)]
pub struct ProjectStatusFilter {
    pub status: Option<String>,
}
