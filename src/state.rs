use crate::config::AppConfig;
use crate::store::DocStore;

pub struct AppState {
    pub store: DocStore,
    pub config: AppConfig,
}
