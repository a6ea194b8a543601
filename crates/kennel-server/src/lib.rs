pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod views;

pub use config::{Environment, ServerConfig};
pub use error::{Result, ServerError};
pub use routes::router;
pub use state::AppState;
pub use telemetry::TracerConfig;
pub use views::Views;

use kennel_core::Database;

/// Pick the template source for an environment. Live reload only happens in
/// development and only when a views directory was given.
pub fn views_for(environment: Environment, views_dir: Option<&std::path::Path>) -> Views {
    match views_dir {
        Some(dir) if environment.is_development() => Views::live(dir),
        _ => Views::bundled(),
    }
}

/// Open the database, apply pending migrations and serve until ctrl-c.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let db = Database::open(&config.db_path)?;
    let applied = db.migrate()?;
    for migration in &applied {
        tracing::info!(version = migration.version, name = migration.name, "applied migration");
    }

    let views = views_for(config.environment, config.views_dir.as_deref());
    if let Some(dir) = views.reload_dir() {
        tracing::info!(dir = %dir.display(), "live template reload enabled");
    }

    let app = router(AppState::new(db, views), &config.tracer);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        environment = %config.environment,
        service = %config.tracer.service_name,
        "Starting server"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
