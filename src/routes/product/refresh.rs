use crate::middleware::authentication::UserScope;
use crate::routes::review::parse_id;
use crate::services::ReviewImporter;
use actix_web::{post, web, HttpResponse, Responder, Result};

/// Pulls new reviews for an already tracked product.
#[tracing::instrument(name = "Refresh tracked product.", skip(importer, user))]
#[post("/{id}/refresh")]
pub async fn refresh_handler(
    path: web::Path<(String,)>,
    user: UserScope,
    importer: web::Data<ReviewImporter>,
) -> Result<impl Responder> {
    let id = parse_id(&path.0)?;
    let summary = importer.refresh(id, user.id()).await?;

    Ok(HttpResponse::Ok().json(summary))
}
