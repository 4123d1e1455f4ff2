//! Domain logic for the construction-element description catalog.
//!
//! Everything here is pure: placeholder mapping, rendering, the approval
//! state machine and field validation. Persistence lives in `cype-db`.

pub mod categories;
pub mod error;
pub mod placeholder;
pub mod rendering;
pub mod types;
pub mod variables;
pub mod workflow;
