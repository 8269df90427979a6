//! API shared state: the core's domain collaborators, wired against the production SQLite Store.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::ingest::Ingestor;
use crate::notifier::HttpNotifier;
use crate::registrar::Registrar;
use crate::settings::StoreSettingsProvider;
use crate::store::sqlite::SqliteStore;
use crate::sweeper::Sweeper;

pub type AppIngestor = Ingestor<SqliteStore, HttpNotifier, StoreSettingsProvider<SqliteStore>, SystemClock>;
pub type AppRegistrar = Registrar<SqliteStore, SystemClock>;
pub type AppSweeper = Sweeper<SqliteStore, HttpNotifier, StoreSettingsProvider<SqliteStore>, SystemClock>;

/// Shared state passed to all API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<SqliteStore>,
    pub ingestor: Arc<AppIngestor>,
    pub registrar: Arc<AppRegistrar>,
    pub sweeper: Arc<AppSweeper>,
    pub clock: Arc<SystemClock>,
}

impl ApiState {
    pub fn new(
        store: Arc<SqliteStore>,
        notifier: Arc<HttpNotifier>,
        settings: Arc<StoreSettingsProvider<SqliteStore>>,
        clock: Arc<SystemClock>,
    ) -> Self {
        let ingestor = Arc::new(Ingestor::new(
            store.clone(),
            notifier.clone(),
            settings.clone(),
            clock.clone(),
        ));
        let registrar = Arc::new(Registrar::new(store.clone(), clock.clone()));
        let sweeper = Arc::new(Sweeper::new(store.clone(), notifier, settings, clock.clone()));

        Self {
            store,
            ingestor,
            registrar,
            sweeper,
            clock,
        }
    }

    /// Current time as seen by maintenance-window handling (§6.3), which has no ingest/sweep
    /// transition to thread a `now` through.
    pub fn clock_now(&self) -> i64 {
        self.clock.now()
    }
}
