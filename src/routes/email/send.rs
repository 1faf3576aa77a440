use crate::connectors::Connectors;
use crate::forms::SendEmailForm;
use crate::helpers::JsonResponse;
use actix_web::{post, web, HttpResponse, Responder, Result};
use serde_json::json;
use serde_valid::Validate;

#[tracing::instrument(name = "Send email.", skip(connectors, form), fields(to = %form.to))]
#[post("/send-email")]
pub async fn send_email_handler(
    form: web::Json<SendEmailForm>,
    connectors: web::Data<Connectors>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        tracing::debug!("Invalid email request {:?}", errors.to_string());
        return Err(JsonResponse::<String>::bad_request(
            "Missing required fields: to, subject, body",
        ));
    }

    connectors
        .outlook
        .send_mail(form.to.trim(), &form.subject, &form.body)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Email sent successfully",
    })))
}
