//! HTTP API for habitd
//!
//! Thin transport glue: routing, request/response shapes, and error
//! mapping. All habit logic lives in the stats engine, the dialog state
//! machine, and the store.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::db::Database;
use crate::dialog::DialogService;
use crate::i18n::Language;
use crate::store::DatabaseStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub store: DatabaseStore,
    pub dialogs: Arc<DialogService<DatabaseStore>>,
    pub default_lang: Language,
}

impl AppState {
    pub fn new(db: Database, default_lang: Language) -> Self {
        let store = DatabaseStore::new(db.clone());
        Self {
            dialogs: Arc::new(DialogService::new(store.clone())),
            store,
            db,
            default_lang,
        }
    }
}
