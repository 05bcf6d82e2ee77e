use crate::config::AppConfig;
use crate::tasks::TaskQueue;

pub struct AppState {
    pub config: AppConfig,
    pub queue: TaskQueue,
}
