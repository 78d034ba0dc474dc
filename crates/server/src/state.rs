use std::sync::Arc;

use configs::StoreConfig;
use models::{LogFields, TicketFields};
use service::{RecordService, TableStore};

/// Per-collection services sharing one store handle created at startup.
#[derive(Clone)]
pub struct AppState {
    pub logs: RecordService<LogFields>,
    pub tickets: RecordService<TicketFields>,
}

impl AppState {
    pub fn new(store: Arc<dyn TableStore>, cfg: &StoreConfig) -> Self {
        Self::with_tables(store, &cfg.logs_table, &cfg.tickets_table)
    }

    pub fn with_tables(store: Arc<dyn TableStore>, logs_table: &str, tickets_table: &str) -> Self {
        Self {
            logs: RecordService::new(Arc::clone(&store), logs_table),
            tickets: RecordService::new(store, tickets_table),
        }
    }
}
