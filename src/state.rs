use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::config::CalendarConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub calendar: CalendarConfig,
}
