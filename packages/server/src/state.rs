use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::upstream::{GenerativeModel, ScanGateway};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub scanner: Arc<dyn ScanGateway>,
    pub model: Arc<dyn GenerativeModel>,
}
