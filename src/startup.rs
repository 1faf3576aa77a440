use crate::configuration::Settings;
use crate::connectors::Connectors;
use crate::routes;
use crate::services::{ReviewAnalyzer, ReviewImporter};
use crate::storage::ReviewStore;
use actix_cors::Cors;
use actix_web::{dev::Server, error, http, middleware, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub async fn run(
    listener: TcpListener,
    store: Arc<dyn ReviewStore>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let connectors = Connectors::from_config(&settings.connectors)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let analyzer = Arc::new(ReviewAnalyzer::new(connectors.completion.clone()));
    let importer = ReviewImporter::new(store.clone(), connectors.marketplaces(), analyzer.clone());

    let store = web::Data::new(store);
    let analyzer = web::Data::from(analyzer);
    let importer = web::Data::new(importer);
    let connectors = web::Data::new(connectors);
    let settings = web::Data::new(settings);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let body = match &err {
            error::JsonPayloadError::Deserialize(err) => serde_json::json!({
                "kind": "deserialize",
                "line": err.line(),
                "column": err.column(),
                "msg": err.to_string(),
            }),
            other => serde_json::json!({ "kind": "other", "msg": other.to_string() }),
        };
        tracing::debug!("Rejected JSON payload: {}", body);
        error::InternalError::from_response(
            err,
            actix_web::HttpResponse::build(http::StatusCode::BAD_REQUEST).json(body),
        )
        .into()
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(Cors::permissive())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/reviews")
                            .service(routes::review::list_handler)
                            .service(routes::review::imported_handler)
                            .service(routes::review::board_handler)
                            .service(routes::review::item_handler)
                            .service(routes::review::status_handler)
                            .service(routes::review::reply_handler)
                            .service(routes::review::analyze_handler),
                    )
                    .service(
                        web::scope("/products")
                            .service(routes::product::tracked_handler)
                            .service(routes::product::refresh_handler)
                            .service(routes::product::delete_handler),
                    )
                    .service(
                        web::scope("/emails")
                            .service(routes::email::list_emails_handler)
                            .service(routes::email::classify_email_handler)
                            .service(routes::email::import_emails_handler),
                    )
                    .service(web::scope("/auth").service(routes::auth::user_handler))
                    .service(routes::analytics_handler)
                    .service(routes::generate_reply_handler)
                    .service(routes::email::send_email_handler)
                    .service(routes::marketplace::amazon_preview_handler)
                    .service(routes::marketplace::shopify_products_handler)
                    .service(routes::marketplace::import_handler)
                    .service(routes::marketplace::status_handler),
            )
            .app_data(json_config.clone())
            .app_data(store.clone())
            .app_data(analyzer.clone())
            .app_data(importer.clone())
            .app_data(connectors.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
