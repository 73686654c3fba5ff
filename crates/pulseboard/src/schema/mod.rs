//! Column semantics: types and per-column metadata.

mod column;
mod types;

pub use column::{ColumnMeta, MAX_DESCRIPTION_CHARS, truncate_description};
pub use types::ColumnType;
