use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Variable '{name}' already exists for this element type")]
    DuplicateName { name: String },

    #[error("Option '{value}' already exists for this variable")]
    DuplicateOption { value: String },

    #[error("Invalid variable kind '{kind}'. Must be one of: TEXT, NUMERIC, DATE")]
    InvalidKind { kind: String },

    #[error(
        "Invalid template: undefined placeholders [{}], missing required variables [{}]",
        undefined_placeholders.join(", "),
        missing_required_variables.join(", ")
    )]
    InvalidTemplate {
        undefined_placeholders: Vec<String>,
        missing_required_variables: Vec<String>,
    },

    #[error("Invalid template version: {0}")]
    InvalidVersion(String),

    #[error("Variable {variable_id} does not belong to element type {element_type_id}")]
    VariableMismatch {
        variable_id: DbId,
        element_type_id: DbId,
    },

    #[error("Instance code '{instance_code}' is already used in this project")]
    DuplicateInstanceCode { instance_code: String },

    #[error("Cannot {action} a template version in state {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Variable '{name}' is referenced by a template mapping or a project value")]
    VariableInUse { name: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
