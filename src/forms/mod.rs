pub mod email;
pub mod import;
pub mod review;

pub use email::*;
pub use import::*;
pub use review::*;
