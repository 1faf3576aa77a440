pub mod analytics;
pub mod auth;
pub mod email;
pub mod health_checks;
pub mod marketplace;
pub mod product;
pub mod reply;
pub mod review;

pub use analytics::*;
pub use health_checks::*;
pub use reply::*;
