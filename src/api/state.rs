use std::sync::Arc;

use crate::application::{ChatService, IndexService};
use crate::domain::ports::DocumentStore;
use crate::infrastructure::Config;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub index: Arc<IndexService>,
    pub documents: Arc<dyn DocumentStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        chat: Arc<ChatService>,
        index: Arc<IndexService>,
        documents: Arc<dyn DocumentStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            chat,
            index,
            documents,
            config,
        }
    }
}
