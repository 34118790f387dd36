//! Borrow service
//!
//! Serves the borrow ledger over HTTP and consumes borrow requests from the
//! message broker in a supervised background task.

use sqlx::postgres::PgPoolOptions;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use library_services::{
    api,
    config::AppConfig,
    repository::{migrations, BorrowLedgerStore, Repository},
    services::{
        borrows::BorrowsService,
        consumer::{AmqpBroker, BorrowConsumer, ConsumerState},
        existence::HttpExistenceClient,
        Services,
    },
    telemetry, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    telemetry::init(&config.logging);

    tracing::info!("Starting borrow service v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!("Connected to database");

    migrations::run_borrows(&pool).await?;

    tracing::info!("Database migrations completed");

    let repository = Repository::new(pool);
    let ledger: Arc<dyn BorrowLedgerStore> = Arc::new(repository.borrows.clone());

    let timeout = config.dependencies.timeout_secs.map(Duration::from_secs);
    let students = HttpExistenceClient::new(&config.dependencies.user_service_url, "student", timeout)?;
    let books = HttpExistenceClient::new(&config.dependencies.book_service_url, "book", timeout)?;

    let borrows = BorrowsService::new(
        ledger,
        Arc::new(students),
        Arc::new(books),
        config.consumer.borrow_limit,
    );

    let cancel = CancellationToken::new();

    let (consumer_state, consumer_task) = if config.consumer.enabled {
        let consumer = BorrowConsumer::new(
            AmqpBroker::new(config.broker.clone()),
            borrows.clone(),
            config.consumer.reconnect.clone(),
            cancel.clone(),
        );
        let state = consumer.subscribe();
        (state, Some(consumer.spawn()))
    } else {
        tracing::warn!("Borrow consumer disabled by configuration");
        let (_, state) = tokio::sync::watch::channel(ConsumerState::Stopped);
        (state, None)
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState {
        services: Arc::new(Services::new(borrows, consumer_state)),
    };

    let app = api::borrow_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .into_future();

    let Some(mut consumer_task) = consumer_task else {
        server.await?;
        return Ok(());
    };

    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        _ = &mut consumer_task => {
            // Outside of shutdown the consumer only ends if it failed
            if !cancel.is_cancelled() {
                tracing::error!("Borrow consumer ended unexpectedly, shutting down");
                anyhow::bail!("borrow consumer ended unexpectedly");
            }
            server.await?;
            return Ok(());
        }
    }

    consumer_task.await?;

    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown requested");
    cancel.cancel();
}
