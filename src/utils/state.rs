use std::sync::Arc;

use crate::{models::cache::ResponseCache, providers::SessionProvider};

pub struct AppState {
    pub provider: Arc<dyn SessionProvider>,
    pub response_cache: ResponseCache,
}
