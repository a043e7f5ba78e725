//! Web front-end for a pre-trained spam classifier.
//!
//! `GET /` serves a form, `POST /predict` runs the submitted `email_text`
//! through the loaded TF-IDF vectorizer and classifier and renders the
//! page again with a Spam/Ham label.

pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod logger;
pub mod models;
pub mod page;

use actix_web::web;

pub use config::Config;
pub use error::{AppError, ArtifactError, InferenceError};
pub use inference::SpamModel;
pub use models::{Label, Prediction};

/// Largest accepted form body.
pub const MAX_FORM_BYTES: usize = 256 * 1024;

/// Registers the service routes. The caller provides the
/// `web::Data<SpamModel>` app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(MAX_FORM_BYTES)
            .error_handler(error::form_error),
    )
        .service(web::resource("/").route(web::get().to(handlers::home)))
        .service(web::resource("/predict").route(web::post().to(handlers::predict)));
}
