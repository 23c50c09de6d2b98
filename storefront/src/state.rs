// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::session::SessionProvisioner;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<flow::Registry<AppError>>,
  pub config: Arc<AppConfig>,
  pub sessions: Arc<dyn SessionProvisioner>,
}

impl AppState {
  /// Builds the state and registers every pipeline on a fresh registry.
  pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>, sessions: Arc<dyn SessionProvisioner>) -> Self {
    let flows = Arc::new(flow::Registry::<AppError>::new());
    crate::pipelines::register_all_pipelines(&flows);
    Self {
      store,
      flows,
      config,
      sessions,
    }
  }
}
