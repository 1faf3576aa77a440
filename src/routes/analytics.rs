use crate::forms::DateRangeQuery;
use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::services::AnalyticsReport;
use crate::storage::ReviewStore;
use actix_web::{get, web, Responder, Result};
use std::sync::Arc;

#[tracing::instrument(name = "Review analytics.", skip(store, user))]
#[get("/analytics")]
pub async fn analytics_handler(
    query: web::Query<DateRangeQuery>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let filter = query
        .to_filter()
        .map_err(|err| JsonResponse::<AnalyticsReport>::build().bad_request(err))?;

    store
        .list_reviews(&filter, user.id())
        .await
        .map_err(|_err| JsonResponse::<AnalyticsReport>::build().internal_server_error(""))
        .map(|reviews| {
            JsonResponse::build()
                .set_item(AnalyticsReport::from_reviews(&reviews))
                .ok("OK")
        })
}
