pub mod get;
pub mod update;
mod analyze;

pub use analyze::*;
pub use get::*;
pub use update::*;

use crate::helpers::JsonResponse;
use uuid::Uuid;

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, actix_web::Error> {
    Uuid::parse_str(raw).map_err(|_| JsonResponse::<String>::bad_request(format!("Invalid id: {}", raw)))
}
