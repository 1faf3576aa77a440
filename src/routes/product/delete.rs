use crate::forms::DeleteProductQuery;
use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::routes::review::parse_id;
use crate::storage::{ProductDeletion, ReviewStore};
use actix_web::{delete, web, Responder, Result};
use std::sync::Arc;

/// Stops tracking a product. With `cascade=true` its reviews go too.
#[tracing::instrument(name = "Delete tracked product.", skip(store, user))]
#[delete("/{id}")]
pub async fn delete_handler(
    path: web::Path<(String,)>,
    query: web::Query<DeleteProductQuery>,
    user: UserScope,
    store: web::Data<Arc<dyn ReviewStore>>,
) -> Result<impl Responder> {
    let id = parse_id(&path.0)?;

    let deletion = store
        .delete_product(id, query.cascade, user.id())
        .await
        .map_err(|err| JsonResponse::<ProductDeletion>::build().internal_server_error(err))?;

    if !deletion.deleted {
        return Err(JsonResponse::<ProductDeletion>::build().not_found("Product not found"));
    }

    tracing::info!(
        reviews_deleted = deletion.reviews_deleted,
        "Deleted product {} (cascade: {})",
        id,
        query.cascade
    );
    Ok(JsonResponse::build().set_id(id).set_item(deletion).ok("Deleted"))
}
