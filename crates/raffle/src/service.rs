//! Board operations: claim, release, reset, state queries and exports.
//!
//! Mutations run under the [`ReservationGuard`]; reads go straight to the
//! store and may observe a mutation in flight.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::{secret_matches, AdminSession};
use crate::config::{NamePolicy, RaffleConfig, TakenPolicy};
use crate::error::RaffleError;
use crate::export::{ExportFile, Report, ReportKind};
use crate::metrics::RaffleMetrics;
use crate::reservation::ReservationGuard;
use crate::slot_store::SlotStore;
use crate::types::{Slot, SlotId, SlotState, SlotUpdate};

/// Result of a successful claim request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The slot was free and is now recorded under the caller's name.
    Claimed,
    /// The slot already had a claimant, who was left untouched.
    AlreadyTaken,
}

/// The raffle board service shared by every request handler.
pub struct RaffleService {
    store: Arc<dyn SlotStore>,
    guard: ReservationGuard,
    config: Arc<RaffleConfig>,
    metrics: Arc<RaffleMetrics>,
    session: AdminSession,
}

impl RaffleService {
    /// Create a service over `store`. Validates the configuration.
    pub fn new(
        store: Arc<dyn SlotStore>,
        config: Arc<RaffleConfig>,
        metrics: Arc<RaffleMetrics>,
    ) -> Result<Self, RaffleError> {
        config.validate()?;
        Ok(Self {
            store,
            guard: ReservationGuard::new(),
            config,
            metrics,
            session: AdminSession::generate(),
        })
    }

    pub fn config(&self) -> &RaffleConfig {
        &self.config
    }

    pub fn metrics(&self) -> &RaffleMetrics {
        &self.metrics
    }

    /// Seed the board on first start.
    pub async fn init(&self) -> Result<(), RaffleError> {
        if self.store.initialize_if_empty().await? {
            tracing::info!("seeded empty board with 100 free slots");
        }
        self.snapshot().await?;
        Ok(())
    }

    /// Claim a free slot for `name`.
    ///
    /// `slot` is the two-digit wire form. Validation happens before the guard is
    /// taken, so malformed requests never touch the store.
    pub async fn claim(&self, slot: &str, name: &str) -> Result<ClaimOutcome, RaffleError> {
        let id: SlotId = slot.parse()?;
        let name = self.resolve_name(name)?;

        let outcome = {
            let _permit = self.guard.acquire().await;
            match self.store.get(id).await? {
                Some(current) if !current.taken => {
                    if self.store.claim_if_free(id, &name, Utc::now()).await? {
                        ClaimOutcome::Claimed
                    } else {
                        // Another process sharing the store won the row.
                        ClaimOutcome::AlreadyTaken
                    }
                }
                Some(_) => ClaimOutcome::AlreadyTaken,
                None => {
                    return Err(RaffleError::Storage {
                        reason: format!("slot {id} missing from store"),
                        source: None,
                    })
                }
            }
        };

        match outcome {
            ClaimOutcome::Claimed => {
                self.metrics.claims.inc();
                self.metrics.slots_taken.inc();
                tracing::info!(slot = %id, "slot claimed");
                Ok(outcome)
            }
            ClaimOutcome::AlreadyTaken => {
                self.metrics.claims_lost.inc();
                tracing::debug!(slot = %id, policy = %self.config.taken_policy, "claim on taken slot");
                match self.config.taken_policy {
                    TakenPolicy::Silent => Ok(outcome),
                    TakenPolicy::Conflict => Err(RaffleError::SlotTaken { slot: id }),
                }
            }
        }
    }

    fn resolve_name(&self, name: &str) -> Result<String, RaffleError> {
        let name = name.trim();
        if name.chars().any(char::is_control) {
            return Err(RaffleError::Validation {
                reason: "claimant name contains control characters".to_string(),
            });
        }
        if !name.is_empty() {
            return Ok(name.to_string());
        }
        match self.config.name_policy {
            NamePolicy::Strict => Err(RaffleError::Validation {
                reason: "claimant name is required".to_string(),
            }),
            NamePolicy::Lenient => Ok(self.config.name_placeholder.clone()),
        }
    }

    /// Check the admin key.
    pub fn authorize(&self, credential: &str) -> Result<(), RaffleError> {
        if secret_matches(&self.config.admin_key, credential) {
            return Ok(());
        }
        self.metrics.auth_failures.inc();
        tracing::warn!("rejected administrative credential");
        Err(RaffleError::Unauthorized)
    }

    /// Free a slot regardless of its current state. Idempotent.
    ///
    /// The credential is checked before the slot number.
    pub async fn release(&self, slot: &str, credential: &str) -> Result<(), RaffleError> {
        self.authorize(credential)?;
        let id: SlotId = slot.parse()?;

        let was_taken = {
            let _permit = self.guard.acquire().await;
            let was_taken = self
                .store
                .get(id)
                .await?
                .map(|s| s.taken)
                .unwrap_or(false);
            self.store
                .update(id, SlotUpdate::released(Utc::now()))
                .await?;
            was_taken
        };

        self.metrics.releases.inc();
        if was_taken {
            self.metrics.slots_taken.dec();
        }
        tracing::info!(slot = %id, was_taken, "slot released");
        Ok(())
    }

    /// Free every slot.
    pub async fn reset(&self, credential: &str) -> Result<(), RaffleError> {
        self.authorize(credential)?;
        {
            let _permit = self.guard.acquire().await;
            self.store.reset_all(Utc::now()).await?;
        }
        self.metrics.resets.inc();
        self.metrics.slots_taken.set(0);
        tracing::info!("board reset");
        Ok(())
    }

    /// Read every slot once, in id order.
    pub async fn snapshot(&self) -> Result<Vec<Slot>, RaffleError> {
        let slots = self.store.list_all().await?;
        let taken = slots.iter().filter(|s| s.taken).count();
        self.metrics.slots_taken.set(taken as i64);
        tracing::debug!(taken, "read board snapshot");
        Ok(slots)
    }

    /// Public projection of the board for the page and polling.
    pub async fn list_state(&self) -> Result<Vec<SlotState>, RaffleError> {
        Ok(self.snapshot().await?.iter().map(SlotState::from).collect())
    }

    /// Number of free slots.
    pub async fn free_count(&self) -> Result<usize, RaffleError> {
        Ok(self.snapshot().await?.iter().filter(|s| !s.taken).count())
    }

    /// Exchange the view key for a session token. `None` on mismatch.
    pub fn login(&self, view_key: &str) -> Option<&str> {
        if secret_matches(&self.config.admin_view_key, view_key) {
            tracing::info!("admin session opened");
            Some(self.session.token())
        } else {
            self.metrics.auth_failures.inc();
            tracing::warn!("rejected admin view key");
            None
        }
    }

    /// Whether a presented session cookie is valid.
    pub fn has_session(&self, cookie: Option<&str>) -> bool {
        cookie.is_some_and(|c| self.session.is_valid(c))
    }

    /// Whether the admin panel should be shown.
    pub fn shows_admin_panel(&self, view_key: Option<&str>, cookie: Option<&str>) -> bool {
        view_key.is_some_and(|k| secret_matches(&self.config.admin_view_key, k))
            || self.has_session(cookie)
    }

    /// Build a spreadsheet export. Requires the admin key or a session cookie.
    pub async fn export(
        &self,
        kind: ReportKind,
        credential: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<ExportFile, RaffleError> {
        if !self.has_session(cookie) {
            self.authorize(credential.unwrap_or_default())?;
        }
        let slots = self.snapshot().await?;
        let file = Report::build(kind, &slots, &self.config).into_file(kind, Utc::now())?;
        tracing::info!(?kind, bytes = file.bytes.len(), "export generated");
        Ok(file)
    }
}
