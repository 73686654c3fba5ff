//! Input parsing and data source handling.

mod format;
mod parser;
mod source;

pub use format::InputFormat;
pub use parser::{Parser, ParserConfig};
pub use source::{RawTable, RawValue, Row, SourceMetadata};
