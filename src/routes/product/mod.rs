pub mod get;
mod delete;
mod refresh;

pub use delete::*;
pub use get::*;
pub use refresh::*;
