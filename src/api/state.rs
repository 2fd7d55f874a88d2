//! Application state for the damage ledger API.
//!
//! The store lives behind one mutex: every mutating operation reads and then
//! writes the ledger, so concurrent requests are serialized.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::config::ConfigLoader;
use crate::error::LedgerResult;
use crate::ledger::LedgerStore;
use crate::parsing::ParserChain;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<LedgerStore>>,
    chain: Arc<ParserChain>,
}

impl AppState {
    /// Creates a new application state around a store and grammar chain.
    pub fn new(store: LedgerStore, chain: ParserChain) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            chain: Arc::new(chain),
        }
    }

    /// Creates an empty store and grammar chain from configuration.
    pub fn from_config(loader: &ConfigLoader) -> LedgerResult<Self> {
        Ok(Self::new(loader.store(), loader.parser_chain()?))
    }

    /// Locks the store for the duration of one operation.
    pub async fn store(&self) -> MutexGuard<'_, LedgerStore> {
        self.store.lock().await
    }

    /// Returns the grammar chain.
    pub fn chain(&self) -> &ParserChain {
        &self.chain
    }
}
