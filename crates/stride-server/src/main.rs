use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use stride_api::{AppState, AppStateInner, activity, maintenance, users};
use stride_streaks::{Clock, SystemClock};

mod jobs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stride=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("STRIDE_DB_PATH").unwrap_or_else(|_| "stride.db".into());
    let host = std::env::var("STRIDE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("STRIDE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let sweep_interval_secs: u64 = std::env::var("STRIDE_SWEEP_INTERVAL_SECS")
        .unwrap_or_else(|_| "3600".into())
        .parse()?;

    // Init database
    let db = Arc::new(stride_db::Database::open(&PathBuf::from(&db_path))?);
    info!("Tracking participation for {} users", db.count_users()?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db: db.clone(),
        clock: clock.clone(),
    });

    // Background maintenance
    let maintenance_jobs: Vec<Arc<dyn jobs::MaintenanceJob>> =
        vec![Arc::new(jobs::StreakSweepJob::new(db.clone()))];
    tokio::spawn(jobs::run_maintenance_loop(
        maintenance_jobs,
        clock,
        Duration::from_secs(sweep_interval_secs),
    ));

    // Routes
    let app = Router::new()
        .route("/health", get(maintenance::health))
        .route("/users", post(users::create_user))
        .route("/users/{user_id}/streak", get(users::get_streak))
        .route("/users/{user_id}/activity", post(activity::record_activity))
        .route("/maintenance/sweep", post(maintenance::run_sweep))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("stride listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
