//! Column type inference.

mod date;
mod sample;

pub use date::{looks_like_date, parse_date};
pub use sample::TypeInference;
