use std::sync::Arc;

use plottrader_session::SessionRegistry;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { sessions: Arc::new(SessionRegistry::new()), config: Arc::new(config) }
    }
}
