pub mod element_type;
pub mod project;
pub mod project_element;
pub mod template;
pub mod variable;
