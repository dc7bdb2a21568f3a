use std::sync::Arc;

use crate::db::Db;
use crate::services::fetcher::ResponseFetcher;
use crate::services::runs::RunRegistry;

/// Shared by every worker.
pub struct AppState {
    pub db: Db,
    pub runs: Arc<RunRegistry>,
    pub fetcher: ResponseFetcher,
}

impl AppState {
    pub fn new(db: Db, fetcher: ResponseFetcher) -> Self {
        AppState {
            db,
            runs: Arc::new(RunRegistry::new()),
            fetcher,
        }
    }
}
