mod platform;
mod product;
pub mod review;
mod user;

pub use platform::*;
pub use product::*;
pub use review::*;
pub use user::*;
