use std::sync::Arc;
use crate::config::settings::AppConfig;
use crate::infrastructure::process::CommandRunner;
use crate::modules::jobs::service::JobDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: JobDispatcher,
}

impl AppState {
    pub fn new(config: AppConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let config = Arc::new(config);
        Self {
            dispatcher: JobDispatcher::new(config.clone(), runner),
            config,
        }
    }
}
