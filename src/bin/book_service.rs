//! Book service
//!
//! CRUD over the book catalog.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

use library_services::{
    api,
    config::AppConfig,
    repository::{migrations, Repository},
    services::books::BooksService,
    telemetry, BookState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    telemetry::init(&config.logging);

    tracing::info!("Starting book service v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    migrations::run_books(&pool).await?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.book_port);

    let repository = Repository::new(pool);
    let state = BookState {
        books: BooksService::new(Arc::new(repository.books)),
    };

    let app = api::book_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
