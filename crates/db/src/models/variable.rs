//! Variable and allowed-option models and DTOs.

use cype_core::error::CoreError;
use cype_core::types::{DbId, Timestamp};
use cype_core::variables::{InputType, VariableKind};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A row from the `element_variables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Variable {
    pub id: DbId,
    pub element_type_id: DbId,
    pub name: String,
    pub kind: String,
    pub unit: Option<String>,
    pub default_value: Option<String>,
    pub is_required: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Variable {
    pub fn kind(&self) -> Result<VariableKind, CoreError> {
        self.kind.parse()
    }
}

/// A row from the `variable_options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VariableOption {
    pub id: DbId,
    pub variable_id: DbId,
    pub value: String,
    pub label: Option<String>,
    pub display_order: i32,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A variable together with its allowed options.
#[derive(Debug, Clone, Serialize)]
pub struct VariableWithOptions {
    #[serde(flatten)]
    pub variable: Variable,
    pub input_type: InputType,
    pub options: Vec<VariableOption>,
}

impl VariableWithOptions {
    pub fn new(variable: Variable, options: Vec<VariableOption>) -> Self {
        Self {
            variable,
            input_type: InputType::for_option_count(options.len()),
            options,
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVariable {
    pub name: String,
    /// One of `TEXT`, `NUMERIC`, `DATE`.
    pub kind: String,
    pub unit: Option<String>,
    pub default_value: Option<String>,
    /// Defaults to `true`.
    pub is_required: Option<bool>,
    /// Defaults to `0`.
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVariableOption {
    pub value: String,
    pub label: Option<String>,
    /// Defaults to `false`. A new default clears the previous one.
    pub is_default: Option<bool>,
    pub display_order: Option<i32>,
}

// ---------------------------------------------------------------------------
// Update DTOs
// ---------------------------------------------------------------------------

/// Partial update of an option. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVariableOption {
    pub value: Option<String>,
    pub label: Option<String>,
    pub display_order: Option<i32>,
    /// `true` clears the previous default in the same transaction.
    pub is_default: Option<bool>,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Request body for choosing a variable's default option by value.
#[derive(Debug, Clone, Deserialize)]
pub struct SetDefaultOption {
    pub value: String,
}
