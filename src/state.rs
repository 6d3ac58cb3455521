use std::sync::Arc;

use crate::store::{Catalog, SeatLedger};

/// Store clients shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub ledger: Arc<dyn SeatLedger>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, ledger: Arc<dyn SeatLedger>) -> Self {
        Self { catalog, ledger }
    }

    /// Uses one store for both the catalog and the ledger.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: Catalog + SeatLedger + 'static,
    {
        Self::new(store.clone(), store)
    }
}
