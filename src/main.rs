use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use spam_filter::{logger, routes, Config, SpamModel};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logger::init(config.debug);

    // Never serve with a half-loaded model.
    let model = match SpamModel::load(&config.vectorizer, &config.classifier) {
        Ok(model) => web::Data::new(model),
        Err(e) => {
            tracing::error!(error = %e, "cannot start without model artifacts");
            return Err(e.into());
        }
    };

    let addr = (config.host.clone(), config.port);
    tracing::info!(debug = config.debug, "Server running at http://{}:{}", addr.0, addr.1);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(model.clone())
            .wrap(Logger::default())
            .configure(routes)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server
        .bind(&addr)
        .with_context(|| format!("failed to bind {}:{}", addr.0, addr.1))?
        .run()
        .await?;

    Ok(())
}
