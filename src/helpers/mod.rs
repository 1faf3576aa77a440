pub(crate) mod json;
pub mod llm_json;

pub use json::*;
