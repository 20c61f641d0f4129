//! IdentityCoordinator - the single writer of taste identity state.
//!
//! Owns the load -> update -> persist -> publish cycle for every open
//! profile. Each profile gets its own slot:
//!
//! - a write gate (`tokio::sync::Mutex`) that serializes updates for that
//!   profile only; other profiles never wait on it
//! - a `watch` channel holding the current `Arc<TasteIdentity>` snapshot,
//!   which evaluation reads without touching the write gate
//!
//! Decisions are appended to the log and folded under the same gate, and
//! replay reads the log under it too, so the log and the published snapshot
//! never disagree about which events have been applied.
//!
//! Persistence adapters enforce compare-and-swap on the identity version.
//! On a conflict the coordinator reloads the stored identity (when it is not
//! older than the snapshot) and reapplies the event, up to
//! `max_conflict_retries` times. After a best-effort save failure the
//! snapshot is ahead of the store; the next write catches the store up with
//! `replace`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::adapters::TelemetryQueue;
use crate::domain::foundation::{CatalogItemId, DomainError, ErrorCode, ProfileId, Timestamp};
use crate::domain::scoring::{AxisMapping, Evaluator, PresentationAxis, ReinforcementUpdater};
use crate::domain::taste::{
    sort_chronologically, CatalogItem, DecisionEvent, TasteDomain, TasteEvaluatedObject,
    TasteIdentity, TasteVector, TelemetryEvent,
};
use crate::ports::{CatalogProvider, DecisionEventSource, IdentityPersistence};

/// What happens when saving a new identity version fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Log, report, and keep serving the new version from memory.
    #[default]
    BestEffort,
    /// Fail the update and keep serving the previous version.
    Required,
}

/// Runtime knobs of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub durability: Durability,
    pub max_conflict_retries: u32,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            durability: Durability::BestEffort,
            max_conflict_retries: 3,
        }
    }
}

/// Result of folding one decision into an identity.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub identity: Arc<TasteIdentity>,
    /// False when the save failed under best-effort durability.
    pub persisted: bool,
}

/// Result of rebuilding an identity from the decision log.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub identity: Arc<TasteIdentity>,
    pub applied: usize,
    /// Events whose item is no longer in the catalog.
    pub skipped: Vec<CatalogItemId>,
    pub persisted: bool,
}

/// Write-side state, only touched while holding the gate.
#[derive(Debug, Default)]
struct WriteState {
    /// The published snapshot holds versions the store never accepted.
    ahead_of_store: bool,
}

struct ProfileSlot {
    write_gate: Mutex<WriteState>,
    state: watch::Sender<Arc<TasteIdentity>>,
}

impl ProfileSlot {
    fn new(identity: TasteIdentity) -> Self {
        let (state, _) = watch::channel(Arc::new(identity));
        Self {
            write_gate: Mutex::new(WriteState::default()),
            state,
        }
    }

    fn current(&self) -> Arc<TasteIdentity> {
        self.state.borrow().clone()
    }

    fn publish(&self, identity: Arc<TasteIdentity>) {
        self.state.send_replace(identity);
    }
}

pub struct IdentityCoordinator {
    persistence: Arc<dyn IdentityPersistence>,
    catalog: Arc<dyn CatalogProvider>,
    decisions: Arc<dyn DecisionEventSource>,
    evaluator: Evaluator,
    updater: ReinforcementUpdater,
    telemetry: TelemetryQueue,
    settings: CoordinatorSettings,
    slots: RwLock<HashMap<ProfileId, Arc<ProfileSlot>>>,
}

impl IdentityCoordinator {
    pub fn new(
        persistence: Arc<dyn IdentityPersistence>,
        catalog: Arc<dyn CatalogProvider>,
        decisions: Arc<dyn DecisionEventSource>,
    ) -> Self {
        Self {
            persistence,
            catalog,
            decisions,
            evaluator: Evaluator::default(),
            updater: ReinforcementUpdater::default(),
            telemetry: TelemetryQueue::disabled(),
            settings: CoordinatorSettings::default(),
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_updater(mut self, updater: ReinforcementUpdater) -> Self {
        self.updater = updater;
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryQueue) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_settings(mut self, settings: CoordinatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Makes the profile's identity available, loading it once per session.
    ///
    /// A profile with nothing stored gets a fresh zero-vector identity
    /// (version 1, stability 0.5); it is written on its first update.
    /// Opening an already open profile returns the current snapshot.
    pub async fn open(
        &self,
        profile_id: &ProfileId,
        domain: TasteDomain,
    ) -> Result<Arc<TasteIdentity>, DomainError> {
        if let Some(slot) = self.slot(profile_id).await {
            let current = slot.current();
            ensure_domain(&current, domain)?;
            return Ok(current);
        }

        let (identity, created) = match self.persistence.load(profile_id).await? {
            Some(stored) => {
                ensure_domain(&stored, domain)?;
                (stored, false)
            }
            None => (self.fresh_identity(profile_id, domain), true),
        };

        let (slot, installed) = self.install(identity).await;
        let current = slot.current();
        ensure_domain(&current, domain)?;

        if installed {
            if created {
                info!(profile_id = %profile_id, domain = %domain, "Created fresh taste identity");
                self.telemetry.emit(TelemetryEvent::IdentityCreated {
                    profile_id: profile_id.clone(),
                    domain,
                    created_at: current.created_at(),
                });
            } else {
                info!(profile_id = %profile_id, version = %current.version(), "Loaded taste identity");
            }
        }

        Ok(current)
    }

    /// Logs one decision, applies it to an open profile and persists the result.
    ///
    /// The event is appended before its item is resolved, so a decision on
    /// an unknown item stays in the history but leaves the identity alone.
    pub async fn record_decision(&self, event: &DecisionEvent) -> Result<RecordOutcome, DomainError> {
        let slot = self.require_slot(event.profile_id()).await?;
        let mut write = slot.write_gate.lock().await;

        let mut current = slot.current();
        ensure_same_profile(&current, event)?;
        self.decisions.append(event).await?;
        let item = self.resolve_item(current.domain(), event.item_id()).await?;

        let mut attempt = 0;
        let (next, persisted) = loop {
            let next = self.updater.apply(&current, event, &item.attributes);
            let stored = if write.ahead_of_store {
                self.persistence.replace(&next).await
            } else {
                self.persistence.save(&next).await
            };

            match stored {
                Ok(()) => {
                    write.ahead_of_store = false;
                    break (next, true);
                }
                Err(e) if e.is_conflict() && attempt < self.settings.max_conflict_retries => {
                    attempt += 1;
                    warn!(
                        profile_id = %event.profile_id(),
                        attempt,
                        error = %e,
                        "Identity version conflict, reloading"
                    );
                    match self.persistence.load(event.profile_id()).await? {
                        Some(stored) if stored.version() >= current.version() => {
                            current = Arc::new(stored);
                        }
                        _ => write.ahead_of_store = true,
                    }
                }
                Err(e) if e.is_conflict() => return Err(e),
                Err(e) => {
                    self.persistence_failed(&next, &e)?;
                    write.ahead_of_store = true;
                    break (next, false);
                }
            }
        };

        let identity = Arc::new(next);
        slot.publish(identity.clone());

        info!(
            profile_id = %identity.profile_id(),
            action = %event.action(),
            version = identity.version().as_u32(),
            stability = identity.stability().value(),
            persisted,
            "Taste identity updated"
        );
        self.telemetry.emit(TelemetryEvent::IdentityUpdated {
            profile_id: identity.profile_id().clone(),
            event_id: event.id(),
            action: event.action(),
            version: identity.version().as_u32(),
            stability: identity.stability().value(),
            persisted,
            updated_at: identity.updated_at(),
        });

        Ok(RecordOutcome {
            identity,
            persisted,
        })
    }

    /// Rebuilds the profile's identity from its full decision log.
    ///
    /// Opens the profile if needed, then holds its write gate while reading
    /// the log, so no decision can land between the read and the publish.
    /// Starts from a fresh identity and folds every event in timestamp order
    /// (log order for ties). Events whose item is not in the catalog are
    /// skipped. The result replaces whatever was stored.
    pub async fn replay_history(
        &self,
        profile_id: &ProfileId,
        domain: TasteDomain,
    ) -> Result<ReplayOutcome, DomainError> {
        self.open(profile_id, domain).await?;
        let slot = self.require_slot(profile_id).await?;
        let mut write = slot.write_gate.lock().await;

        let mut events = self.decisions.events_for(profile_id).await?;
        sort_chronologically(&mut events);

        let mut resolved: Vec<(DecisionEvent, CatalogItem)> = Vec::with_capacity(events.len());
        let mut skipped = Vec::new();
        for event in events {
            if event.profile_id() != profile_id {
                return Err(profile_mismatch(profile_id, &event));
            }
            match self.catalog.item(domain, event.item_id()).await? {
                Some(item) => resolved.push((event, item)),
                None => {
                    warn!(
                        profile_id = %profile_id,
                        item_id = %event.item_id(),
                        "Skipping decision for unknown catalog item"
                    );
                    skipped.push(event.item_id().clone());
                }
            }
        }

        let fresh = self.fresh_identity(profile_id, domain);
        let rebuilt = self.updater.apply_all(
            &fresh,
            resolved
                .iter()
                .map(|(event, item)| (event, &item.attributes)),
        );

        let persisted = match self.persistence.replace(&rebuilt).await {
            Ok(()) => {
                write.ahead_of_store = false;
                true
            }
            Err(e) => {
                self.persistence_failed(&rebuilt, &e)?;
                write.ahead_of_store = true;
                false
            }
        };

        let identity = Arc::new(rebuilt);
        slot.publish(identity.clone());

        info!(
            profile_id = %profile_id,
            applied = resolved.len(),
            skipped = skipped.len(),
            version = identity.version().as_u32(),
            persisted,
            "Replayed decision history"
        );

        Ok(ReplayOutcome {
            identity,
            applied: resolved.len(),
            skipped,
            persisted,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read side
    // ─────────────────────────────────────────────────────────────────────

    /// Current snapshot, if the profile is open.
    pub async fn snapshot(&self, profile_id: &ProfileId) -> Option<Arc<TasteIdentity>> {
        self.slot(profile_id).await.map(|slot| slot.current())
    }

    /// Current snapshot, or `IdentityNotLoaded` if the profile is not open.
    pub async fn current(&self, profile_id: &ProfileId) -> Result<Arc<TasteIdentity>, DomainError> {
        self.snapshot(profile_id).await.ok_or_else(|| not_loaded(profile_id))
    }

    /// Observer of identity changes for an open profile.
    ///
    /// The receiver always holds the latest committed snapshot.
    pub async fn subscribe(
        &self,
        profile_id: &ProfileId,
    ) -> Option<watch::Receiver<Arc<TasteIdentity>>> {
        self.slot(profile_id).await.map(|slot| slot.state.subscribe())
    }

    /// Scores one item against the profile's current snapshot.
    pub async fn evaluate(
        &self,
        profile_id: &ProfileId,
        item: &CatalogItem,
    ) -> Result<TasteEvaluatedObject, DomainError> {
        let identity = self.current(profile_id).await?;
        Ok(self.score(&identity, item))
    }

    /// Scores every catalog item of the profile's domain.
    ///
    /// Results are ordered by alignment (highest first), then confidence,
    /// then item id, and cut to `limit` when given.
    pub async fn evaluate_catalog(
        &self,
        profile_id: &ProfileId,
        limit: Option<usize>,
    ) -> Result<Vec<TasteEvaluatedObject>, DomainError> {
        let identity = self.current(profile_id).await?;
        let items = self.catalog.items(identity.domain()).await?;

        let mut evaluations: Vec<TasteEvaluatedObject> =
            items.iter().map(|item| self.score(&identity, item)).collect();
        evaluations.sort_by(|a, b| {
            b.alignment_score()
                .cmp(&a.alignment_score())
                .then_with(|| b.confidence().value().total_cmp(&a.confidence().value()))
                .then_with(|| a.item_id().cmp(b.item_id()))
        });
        if let Some(limit) = limit {
            evaluations.truncate(limit);
        }
        Ok(evaluations)
    }

    pub async fn axis_scores(
        &self,
        profile_id: &ProfileId,
    ) -> Result<BTreeMap<PresentationAxis, f64>, DomainError> {
        let identity = self.current(profile_id).await?;
        Ok(AxisMapping::compute_axis_scores(identity.vector()))
    }

    pub async fn reading(&self, profile_id: &ProfileId, name: &str) -> Result<String, DomainError> {
        let scores = self.axis_scores(profile_id).await?;
        Ok(AxisMapping::one_line_reading(name, &scores))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn score(&self, identity: &TasteIdentity, item: &CatalogItem) -> TasteEvaluatedObject {
        let evaluation = self.evaluator.evaluate(identity, item);
        debug!(
            profile_id = %identity.profile_id(),
            item_id = %item.id,
            alignment = evaluation.alignment_score().value(),
            confidence = evaluation.confidence().value(),
            flags = evaluation.tension_flags().len(),
            "Evaluated item"
        );
        self.telemetry.emit(TelemetryEvent::ObjectEvaluated {
            profile_id: identity.profile_id().clone(),
            item_id: item.id.clone(),
            alignment_score: evaluation.alignment_score().value(),
            identity_version: identity.version().as_u32(),
            evaluated_at: evaluation.created_at(),
        });
        evaluation
    }

    fn fresh_identity(&self, profile_id: &ProfileId, domain: TasteDomain) -> TasteIdentity {
        TasteIdentity::fresh_with_vector(
            profile_id.clone(),
            TasteVector::with_tag_capacity(domain, self.updater.tuning().max_tags),
            Timestamp::now(),
        )
    }

    /// Applies the durability policy to a failed save.
    fn persistence_failed(&self, identity: &TasteIdentity, error: &DomainError) -> Result<(), DomainError> {
        if self.settings.durability == Durability::Required {
            return Err(error.clone());
        }

        warn!(
            profile_id = %identity.profile_id(),
            version = identity.version().as_u32(),
            error = %error,
            "Failed to persist taste identity, continuing in memory"
        );
        self.telemetry.emit(TelemetryEvent::IdentityPersistenceFailed {
            profile_id: identity.profile_id().clone(),
            version: identity.version().as_u32(),
            error: error.to_string(),
            failed_at: Timestamp::now(),
        });
        Ok(())
    }

    async fn resolve_item(
        &self,
        domain: TasteDomain,
        item_id: &CatalogItemId,
    ) -> Result<CatalogItem, DomainError> {
        self.catalog.item(domain, item_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::CatalogItemNotFound,
                format!("Catalog item not found: {}", item_id),
            )
            .with_detail("item_id", item_id.as_str())
            .with_detail("domain", domain.as_str())
        })
    }

    async fn slot(&self, profile_id: &ProfileId) -> Option<Arc<ProfileSlot>> {
        self.slots.read().await.get(profile_id).cloned()
    }

    async fn require_slot(&self, profile_id: &ProfileId) -> Result<Arc<ProfileSlot>, DomainError> {
        self.slot(profile_id).await.ok_or_else(|| not_loaded(profile_id))
    }

    /// Inserts a slot unless one exists. Returns the slot and whether it was new.
    async fn install(&self, identity: TasteIdentity) -> (Arc<ProfileSlot>, bool) {
        let mut slots = self.slots.write().await;
        match slots.get(identity.profile_id()) {
            Some(existing) => (existing.clone(), false),
            None => {
                let profile_id = identity.profile_id().clone();
                let slot = Arc::new(ProfileSlot::new(identity));
                slots.insert(profile_id, slot.clone());
                (slot, true)
            }
        }
    }
}

fn ensure_domain(identity: &TasteIdentity, domain: TasteDomain) -> Result<(), DomainError> {
    if identity.domain() == domain {
        return Ok(());
    }
    Err(DomainError::new(
        ErrorCode::ValidationFailed,
        format!(
            "Profile {} has a {} identity, not {}",
            identity.profile_id(),
            identity.domain(),
            domain
        ),
    )
    .with_detail("profile_id", identity.profile_id().as_str()))
}

fn ensure_same_profile(identity: &TasteIdentity, event: &DecisionEvent) -> Result<(), DomainError> {
    if identity.profile_id() == event.profile_id() {
        Ok(())
    } else {
        Err(profile_mismatch(identity.profile_id(), event))
    }
}

fn profile_mismatch(expected: &ProfileId, event: &DecisionEvent) -> DomainError {
    DomainError::new(
        ErrorCode::ProfileMismatch,
        format!(
            "Decision {} belongs to profile {}, not {}",
            event.id(),
            event.profile_id(),
            expected
        ),
    )
    .with_detail("event_id", event.id().to_string())
}

fn not_loaded(profile_id: &ProfileId) -> DomainError {
    DomainError::new(
        ErrorCode::IdentityNotLoaded,
        format!("No identity is open for profile {}", profile_id),
    )
    .with_detail("profile_id", profile_id.as_str())
}
