//! Collector demo for visit-beacon
//!
//! Starts a tiny Axum collector on `127.0.0.1:5000` that prints every event it receives,
//! then drives a beacon through a short visit against it.
//!
//! # Running the demo
//!
//! ```bash
//! # optional: where the beacon keeps its identity and session stamp
//! export DATABASE_URL=sqlite://beacon-demo.db?mode=rwc
//! RUST_LOG=info,visit_beacon=debug cargo run --example collector
//! ```
//!
//! Run it twice: the second run reuses the stored identity and reports `is_new_user: false`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use dotenvy::dotenv;
use sea_orm::Database;
use serde_json::Value;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use visit_beacon::migration::{Migrator, MigratorTrait};
use visit_beacon::{
    Activity, Beacon, BeaconConfig, HttpTransport, PageContext, PageSignal, SeaOrmStore,
    DEFAULT_ENDPOINT,
};

async fn track(Json(event): Json<Value>) -> StatusCode {
    info!(
        "collector received {}",
        serde_json::to_string_pretty(&event).unwrap_or_default()
    );
    StatusCode::NO_CONTENT
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://beacon-demo.db?mode=rwc".to_string());
    info!("Using beacon storage: {}", database_url);

    let conn = Database::connect(&database_url).await?;
    Migrator::up(&conn, None).await?;

    let app = Router::new().route("/api/v1/track", post(track));
    let addr = SocketAddr::from(([127, 0, 0, 1], 5000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Collector listening on http://{}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("collector stopped: {e}");
        }
    });

    let beacon = Beacon::builder(
        Arc::new(SeaOrmStore::new(conn)),
        Arc::new(HttpTransport::new()?),
    )
    .with_config(
        BeaconConfig::default()
            .with_endpoint(DEFAULT_ENDPOINT)
            .with_logging(true),
    )
    .build();

    let page = PageContext::new("http://localhost:8000/pricing")
        .with_referrer("https://search.example/?q=beacon")
        .with_title("Pricing");

    beacon.handle(PageSignal::Loaded(page.clone())).await;
    beacon.handle(PageSignal::Activity(Activity::Scroll)).await;
    beacon.handle(PageSignal::Activity(Activity::Click)).await;
    beacon.handle(PageSignal::Hidden(page)).await;

    // deliveries are fire-and-forget; give them a moment before exiting
    tokio::time::sleep(Duration::from_millis(500)).await;
    Ok(())
}
