use crate::connectors::Connectors;
use crate::forms::{EmailPayload, ImportEmailsForm, LimitQuery};
use crate::helpers::JsonResponse;
use crate::middleware::authentication::UserScope;
use crate::models::Review;
use crate::services::{InboundEmail, ReviewAnalyzer, ReviewImporter};
use actix_web::{get, post, web, HttpResponse, Responder, Result};
use serde::Serialize;
use serde_valid::Validate;

const DEFAULT_INBOX_LIMIT: u32 = 20;

#[tracing::instrument(name = "List mailbox messages.", skip(connectors))]
#[get("")]
pub async fn list_emails_handler(
    query: web::Query<LimitQuery>,
    connectors: web::Data<Connectors>,
) -> Result<impl Responder> {
    let messages = connectors
        .outlook
        .list_messages(query.limit.unwrap_or(DEFAULT_INBOX_LIMIT))
        .await?;

    Ok(JsonResponse::build().set_list(messages).ok("OK"))
}

#[tracing::instrument(name = "Classify email.", skip(analyzer, form))]
#[post("/classify")]
pub async fn classify_email_handler(
    form: web::Json<EmailPayload>,
    analyzer: web::Data<ReviewAnalyzer>,
) -> Result<impl Responder> {
    if form.validate().is_err() || form.is_empty() {
        return Err(JsonResponse::<String>::bad_request("Email subject or body is required"));
    }

    let email: InboundEmail = form.into_inner().into();
    let classification = analyzer
        .classify_email(&email.subject, &email.body, &email.sender_name)
        .await?;

    Ok(HttpResponse::Ok().json(classification))
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailImportReport {
    pub processed: usize,
    pub imported: usize,
    pub ignored: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub reviews: Vec<Review>,
}

/// Imports the emails in the body, or the latest mailbox messages when
/// none are given. A failure on one email does not stop the others.
#[tracing::instrument(name = "Import emails.", skip(connectors, importer, form, user))]
#[post("/import")]
pub async fn import_emails_handler(
    form: web::Json<ImportEmailsForm>,
    user: UserScope,
    connectors: web::Data<Connectors>,
    importer: web::Data<ReviewImporter>,
) -> Result<impl Responder> {
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::<String>::build().form_error(errors.to_string()));
    }

    let form = form.into_inner();
    let emails: Vec<InboundEmail> = if form.emails.is_empty() {
        connectors
            .outlook
            .list_messages(form.limit.unwrap_or(DEFAULT_INBOX_LIMIT))
            .await?
            .into_iter()
            .map(InboundEmail::from)
            .collect()
    } else {
        form.emails
            .into_iter()
            .filter(|email| !email.is_empty())
            .map(InboundEmail::from)
            .collect()
    };

    let mut report = EmailImportReport::default();
    for email in &emails {
        report.processed += 1;
        match importer.import_email(email, user.id()).await {
            Ok(outcome) if outcome.duplicate => report.duplicates += 1,
            Ok(outcome) => match outcome.review {
                Some(review) => {
                    report.imported += 1;
                    report.reviews.push(review);
                }
                None => report.ignored += 1,
            },
            Err(err) => {
                tracing::warn!("Email import failed for {:?}: {}", email.subject, err);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        processed = report.processed,
        imported = report.imported,
        "Email import finished"
    );
    Ok(HttpResponse::Ok().json(report))
}
