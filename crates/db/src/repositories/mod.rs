//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Operations that must share a
//! caller's transaction take `&mut PgConnection` instead.

pub mod approval_repo;
pub mod element_type_repo;
pub mod element_value_repo;
pub mod project_element_repo;
pub mod project_repo;
pub mod rendered_description_repo;
pub mod template_version_repo;
pub mod variable_repo;

pub use approval_repo::ApprovalRepo;
pub use element_type_repo::ElementTypeRepo;
pub use element_value_repo::ElementValueRepo;
pub use project_element_repo::ProjectElementRepo;
pub use project_repo::ProjectRepo;
pub use rendered_description_repo::RenderedDescriptionRepo;
pub use template_version_repo::TemplateVersionRepo;
pub use variable_repo::VariableRepo;
