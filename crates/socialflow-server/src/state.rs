use socialflow_core::SocialFlow;
use std::sync::Arc;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub app: SocialFlow,
}

impl AppStateInner {
    pub fn new(app: SocialFlow) -> AppState {
        Arc::new(Self { app })
    }
}
