//! Server binary: env, tracing, pool, table bootstrap, serve.

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use student_registry::store::ensure_students_table;
use student_registry::{
    common_routes_with_ready, ensure_database_exists, student_routes, AppConfig, AppState,
    PgStudentStore,
};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("signal received, shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("student_registry=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    ensure_students_table(&pool).await?;

    let state = AppState {
        store: Arc::new(PgStudentStore::new(pool)),
    };

    let app = Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(student_routes(state));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
