//! In-memory test board for unit and integration testing.
//!
//! Provides a [`RaffleService`] over a seeded [`MemorySlotStore`] with an
//! admin key and view key already configured.

use std::sync::Arc;

use crate::config::RaffleConfig;
use crate::metrics::RaffleMetrics;
use crate::service::RaffleService;
use crate::storage::memory_slots::MemorySlotStore;

/// Admin key configured by [`TestBoard::new`].
pub const TEST_ADMIN_KEY: &str = "test-admin-key";

/// View key configured by [`TestBoard::new`].
pub const TEST_VIEW_KEY: &str = "test-view-key";

/// A seeded in-memory board for testing.
///
/// # Example
///
/// ```ignore
/// let board = TestBoard::new().await;
/// board.service().claim("07", "Ana").await.unwrap();
/// board.store().set_unavailable(true);
/// ```
pub struct TestBoard {
    service: Arc<RaffleService>,
    store: Arc<MemorySlotStore>,
}

impl TestBoard {
    /// Create a seeded board with default configuration and test secrets.
    pub async fn new() -> Self {
        Self::with_config(RaffleConfig::default()).await
    }

    /// Create a seeded board with custom configuration.
    ///
    /// Empty secrets are filled with [`TEST_ADMIN_KEY`] / [`TEST_VIEW_KEY`].
    pub async fn with_config(mut config: RaffleConfig) -> Self {
        if config.admin_key.is_empty() {
            config.admin_key = TEST_ADMIN_KEY.to_string();
        }
        if config.admin_view_key.is_empty() {
            config.admin_view_key = TEST_VIEW_KEY.to_string();
        }

        let store = Arc::new(MemorySlotStore::new());
        let service = RaffleService::new(
            store.clone(),
            Arc::new(config),
            Arc::new(RaffleMetrics::unregistered()),
        )
        .expect("TestBoard config should be valid");
        service.init().await.expect("memory store should seed");

        Self {
            service: Arc::new(service),
            store,
        }
    }

    /// The service under test.
    pub fn service(&self) -> &Arc<RaffleService> {
        &self.service
    }

    /// The backing store, for failure injection.
    pub fn store(&self) -> &Arc<MemorySlotStore> {
        &self.store
    }
}
