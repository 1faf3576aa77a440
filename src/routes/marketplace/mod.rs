pub mod import;
pub mod status;
mod amazon;
mod shopify;

pub use amazon::*;
pub use import::*;
pub use shopify::*;
pub use status::*;

use crate::helpers::JsonResponse;
use crate::models::Platform;

/// Marketplace named in the path, rejecting anything the importer cannot fetch from.
pub(crate) fn marketplace_from_path(raw: &str) -> Result<Platform, actix_web::Error> {
    raw.parse::<Platform>()
        .ok()
        .filter(|platform| Platform::MARKETPLACES.contains(platform))
        .ok_or_else(|| JsonResponse::<String>::bad_request(format!("Unsupported marketplace: {}", raw)))
}
