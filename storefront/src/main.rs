// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use storefront::config::{AppConfig, LogFormat};
use storefront::services::session::RandomSessionProvisioner;
use storefront::store::{seed, MemoryStore, PgStore, Store};
use storefront::{web, AppState};

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

async fn build_store(config: &AppConfig) -> std::io::Result<Arc<dyn Store>> {
  match &config.database_url {
    Some(database_url) => {
      let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| {
          tracing::error!(error = %e, "Failed to connect to the database.");
          std::io::Error::other(format!("Database connection error: {}", e))
        })?;
      tracing::info!("Successfully connected to the database.");

      let store = PgStore::new(pool);
      store.migrate().await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to run migrations.");
        std::io::Error::other(format!("{:#}", e))
      })?;
      if config.seed_db {
        tracing::warn!("SEED_DB only seeds the in-memory store; ignoring it for Postgres.");
      }
      Ok(Arc::new(store))
    }
    None => {
      tracing::warn!("DATABASE_URL not set, using the in-memory store.");
      let store = MemoryStore::new();
      if config.seed_db {
        seed::seed_demo_catalog(&store);
      }
      Ok(Arc::new(store))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      eprintln!("Configuration error: {}", e);
      return Err(std::io::Error::other(e.to_string()));
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!("Starting storefront server...");

  let store = build_store(&app_config).await?;
  let app_state = AppState::new(store, app_config.clone(), Arc::new(RandomSessionProvisioner));

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
