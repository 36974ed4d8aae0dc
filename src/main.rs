use std::sync::Arc;

use auction_scraper::{
    AppState, build_router,
    config::AppConfig,
    jobs::auction_scraper::{AuctionScraper, start_auction_scraper_job},
    scrapers::fetch::{FetchClient, HttpPageSource, Interrupt},
    services::auction_repository::SeaOrmAuctionRepository,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,auction_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().expect("Invalid configuration");

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // Ctrl-C stops the server, the schedule and any backoff in progress
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });
    let interrupt = Interrupt::new(shutdown_rx);

    let source = HttpPageSource::new(&config.scraper).expect("Failed to build HTTP client");
    let fetcher = FetchClient::new(Arc::new(source), &config.scraper, interrupt.clone());
    let repository = Arc::new(SeaOrmAuctionRepository::new(db));
    let scraper = Arc::new(AuctionScraper::new(
        fetcher,
        repository.clone(),
        config.scraper.source_url.clone(),
    ));

    tracing::info!(
        "Scheduling auction scraper every {:?} (run on startup: {})",
        config.scrape_interval,
        config.run_on_startup
    );
    let job = start_auction_scraper_job(
        scraper.clone(),
        config.scrape_interval,
        config.run_on_startup,
        interrupt.clone(),
    );

    let state = AppState { repository, scraper };
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { interrupt.fired().await })
        .await
        .expect("Server error");

    if let Err(e) = job.await {
        tracing::error!("Auction scraper job ended abnormally: {}", e);
    }
}
