use crate::connectors::Connectors;
use crate::helpers::JsonResponse;
use crate::models::Platform;
use crate::services::ReviewImporter;
use actix_web::{get, web, HttpResponse, Responder, Result};

#[tracing::instrument(name = "Check connector status.", skip(importer, connectors))]
#[get("/{platform}/status")]
pub async fn status_handler(
    path: web::Path<(String,)>,
    importer: web::Data<ReviewImporter>,
    connectors: web::Data<Connectors>,
) -> Result<impl Responder> {
    let platform = path
        .0
        .parse::<Platform>()
        .map_err(|err| JsonResponse::<String>::bad_request(err.to_string()))?;

    let status = match platform {
        Platform::Outlook => connectors.outlook.test_connection().await,
        marketplace => importer
            .marketplaces()
            .get(marketplace)
            .ok_or_else(|| JsonResponse::<String>::not_found("connector not registered"))?
            .test_connection()
            .await,
    };

    Ok(HttpResponse::Ok().json(status))
}
