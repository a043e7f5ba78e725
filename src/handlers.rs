use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::AppError;
use crate::inference::SpamModel;
use crate::models::PredictForm;
use crate::page;

const TEXT_FIELD: &str = "email_text";

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub async fn home() -> HttpResponse {
    html(page::render_index(None))
}

pub async fn predict(
    model: web::Data<SpamModel>,
    form: web::Form<PredictForm>,
) -> Result<HttpResponse, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);

    let text = form
        .into_inner()
        .email_text
        .ok_or(AppError::MissingField(TEXT_FIELD))?;

    // Inference is CPU-bound, keep it off the async workers.
    let worker_span = span.clone();
    let prediction = web::block(move || worker_span.in_scope(|| model.classify(&text))).await??;

    span.in_scope(|| {
        tracing::info!(class = prediction.class, label = %prediction.label, "prediction served");
    });

    Ok(html(page::render_index(Some(prediction.label))))
}
