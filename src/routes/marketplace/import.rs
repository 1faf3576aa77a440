use super::marketplace_from_path;
use crate::forms::ImportForm;
use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::services::ReviewImporter;
use actix_web::{post, web, HttpResponse, Responder, Result};
use serde_valid::Validate;

/// `POST /api/{platform}/import-reviews`, answers with the import summary.
#[tracing::instrument(name = "Import marketplace reviews.", skip(importer, user))]
#[post("/{platform}/import-reviews")]
pub async fn import_handler(
    path: web::Path<(String,)>,
    form: web::Json<ImportForm>,
    user: UserScope,
    importer: web::Data<ReviewImporter>,
) -> Result<impl Responder> {
    let platform = marketplace_from_path(&path.0)?;

    if let Err(errors) = form.validate() {
        tracing::debug!("Invalid import request {:?}", errors.to_string());
        return Err(JsonResponse::<String>::bad_request("Product URL is required"));
    }

    let summary = importer
        .import(platform, form.product_url.trim(), user.id())
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}
