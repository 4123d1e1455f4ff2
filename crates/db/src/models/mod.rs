//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Request or read-model types where an operation needs them

pub mod approval;
pub mod element_type;
pub mod element_value;
pub mod mapping;
pub mod project;
pub mod project_element;
pub mod rendered_description;
pub mod status;
pub mod template_version;
pub mod variable;
