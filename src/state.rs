use std::sync::Arc;
use crate::config::Config;
use crate::domain::services::schedule_service::ScheduleService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub schedule_service: Arc<ScheduleService>,
}
