//! End-to-end tests driving the coordinator through the application handlers
//! with in-memory and filesystem adapters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use tempfile::TempDir;

use taste_identity::adapters::{
    FsIdentityStore, InMemoryDecisionLog, InMemoryIdentityStore, InMemoryTelemetrySink,
    StaticCatalog, TelemetryQueue, TelemetryWorker,
};
use taste_identity::application::{
    EvaluateCatalogHandler, EvaluateCatalogQuery, GetTasteReadingHandler, GetTasteReadingQuery,
    IdentityCoordinator, RecordDecisionCommand, RecordDecisionHandler, ReplayHistoryCommand,
    ReplayHistoryHandler,
};
use taste_identity::domain::foundation::{
    CatalogItemId, CommandMetadata, DomainError, ErrorCode, ProfileId, Timestamp,
};
use taste_identity::domain::taste::{
    CatalogItem, DecisionAction, ItemAttributes, TasteDomain, TasteIdentity,
};
use taste_identity::ports::{DecisionEventSource, IdentityPersistence};

// ════════════════════════════════════════════════════════════════════════════════
// Fixtures
// ════════════════════════════════════════════════════════════════════════════════

fn catalog() -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::new([
        CatalogItem::new(
            CatalogItemId::new("linen-sofa").unwrap(),
            TasteDomain::Space,
            ItemAttributes::new()
                .with_weight("cozy", 0.8)
                .with_weight("natural_materials", 0.6)
                .with_tag("linen"),
        ),
        CatalogItem::new(
            CatalogItemId::new("chrome-stool").unwrap(),
            TasteDomain::Space,
            ItemAttributes::new()
                .with_weight("industrial", 0.9)
                .with_weight("cozy", -0.5)
                .with_tag("chrome"),
        ),
        CatalogItem::new(
            CatalogItemId::new("oak-shelf").unwrap(),
            TasteDomain::Space,
            ItemAttributes::new()
                .with_weight("natural_materials", 0.9)
                .with_weight("minimalist", 0.4),
        ),
    ]))
}

fn profile(name: &str) -> ProfileId {
    ProfileId::new(name).unwrap()
}

fn item(id: &str) -> CatalogItemId {
    CatalogItemId::new(id).unwrap()
}

fn at(offset: i64) -> Option<Timestamp> {
    Some(Timestamp::from_unix_secs(1704326400).plus_secs(offset))
}

fn record(
    profile_id: &ProfileId,
    item_id: &str,
    action: DecisionAction,
    occurred_at: Option<Timestamp>,
) -> RecordDecisionCommand {
    RecordDecisionCommand {
        profile_id: profile_id.clone(),
        domain: TasteDomain::Space,
        item_id: item(item_id),
        action,
        occurred_at,
    }
}

struct Harness {
    coordinator: Arc<IdentityCoordinator>,
    log: Arc<InMemoryDecisionLog>,
    recorder: RecordDecisionHandler,
}

impl Harness {
    fn new(persistence: Arc<dyn IdentityPersistence>) -> Self {
        Self::with_log(persistence, Arc::new(InMemoryDecisionLog::new()))
    }

    fn with_log(persistence: Arc<dyn IdentityPersistence>, log: Arc<InMemoryDecisionLog>) -> Self {
        let coordinator = Arc::new(IdentityCoordinator::new(
            persistence,
            catalog(),
            log.clone(),
        ));
        let recorder = RecordDecisionHandler::new(coordinator.clone());
        Self {
            coordinator,
            log,
            recorder,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Streaming
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn decisions_flow_through_to_scores_and_reading() {
    let store = Arc::new(InMemoryIdentityStore::new());
    let harness = Harness::new(store.clone());
    let ada = profile("ada");

    for (offset, (id, action)) in [
        ("linen-sofa", DecisionAction::Bought),
        ("oak-shelf", DecisionAction::Aligned),
        ("chrome-stool", DecisionAction::NotForMe),
    ]
    .into_iter()
    .enumerate()
    {
        let result = harness
            .recorder
            .handle(record(&ada, id, action, at(offset as i64)), CommandMetadata::new())
            .await
            .unwrap();
        assert!(result.persisted);
        assert_eq!(result.identity.version().as_u32(), offset as u32 + 2);
    }

    assert_eq!(harness.log.events_for(&ada).await.unwrap().len(), 3);
    let stored = store.load(&ada).await.unwrap().unwrap();
    assert_eq!(stored.version().as_u32(), 4);
    assert!(stored.vector().avoids().contains("chrome"));
    assert!(stored.vector().influences().contains("linen"));

    let scored = EvaluateCatalogHandler::new(harness.coordinator.clone())
        .handle(
            EvaluateCatalogQuery {
                profile_id: ada.clone(),
                limit: None,
            },
            CommandMetadata::new(),
        )
        .await
        .unwrap();
    assert_eq!(scored.evaluations.len(), 3);
    assert_eq!(scored.identity_version.as_u32(), 4);
    // the rejected item ends up last
    assert_eq!(scored.evaluations[2].item_id().as_str(), "chrome-stool");
    assert!(scored.evaluations[0].alignment_score() > scored.evaluations[2].alignment_score());

    let reading = GetTasteReadingHandler::new(harness.coordinator.clone())
        .handle(GetTasteReadingQuery {
            profile_id: ada.clone(),
            display_name: "Ada".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(reading.identity_version, 4);
    assert!(reading.reading.contains("Ada"));
}

#[tokio::test]
async fn concurrent_decisions_on_one_profile_serialize() {
    let harness = Arc::new(Harness::new(Arc::new(InMemoryIdentityStore::new())));
    let ada = profile("ada");

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let harness = harness.clone();
            let ada = ada.clone();
            let action = if i % 2 == 0 {
                DecisionAction::Aligned
            } else {
                DecisionAction::Bought
            };
            tokio::spawn(async move {
                harness
                    .recorder
                    .handle(record(&ada, "oak-shelf", action, None), CommandMetadata::new())
                    .await
                    .map(|result| result.identity.version().as_u32())
            })
        })
        .collect();

    let mut versions = Vec::new();
    for task in tasks {
        versions.push(task.await.unwrap().unwrap());
    }
    versions.sort_unstable();

    // every update saw its own predecessor: no version was produced twice
    assert_eq!(versions, (2..=21).collect::<Vec<_>>());
    let current = harness.coordinator.current(&ada).await.unwrap();
    assert_eq!(current.version().as_u32(), 21);
}

#[tokio::test]
async fn profiles_update_independently() {
    let harness = Arc::new(Harness::new(Arc::new(InMemoryIdentityStore::new())));
    let names = ["ada", "grace", "linus", "barbara"];

    let tasks: Vec<_> = names
        .iter()
        .flat_map(|name| (0..5).map(move |_| *name))
        .map(|name| {
            let harness = harness.clone();
            tokio::spawn(async move {
                harness
                    .recorder
                    .handle(
                        record(&profile(name), "linen-sofa", DecisionAction::Aligned, None),
                        CommandMetadata::new(),
                    )
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    for name in names {
        let current = harness.coordinator.current(&profile(name)).await.unwrap();
        assert_eq!(current.version().as_u32(), 6, "profile {}", name);
        assert_eq!(current.profile_id().as_str(), name);
    }
}

#[tokio::test]
async fn evaluations_run_alongside_writes() {
    let harness = Arc::new(Harness::new(Arc::new(InMemoryIdentityStore::new())));
    let ada = profile("ada");
    harness
        .coordinator
        .open(&ada, TasteDomain::Space)
        .await
        .unwrap();

    let writer = {
        let harness = harness.clone();
        let ada = ada.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                harness
                    .recorder
                    .handle(
                        record(&ada, "linen-sofa", DecisionAction::Bought, None),
                        CommandMetadata::new(),
                    )
                    .await
                    .unwrap();
            }
        })
    };
    let reader = {
        let coordinator = harness.coordinator.clone();
        let ada = ada.clone();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..10 {
                let scored = coordinator.evaluate_catalog(&ada, Some(1)).await.unwrap();
                seen.push(scored[0].identity_version_used().as_u32());
                tokio::task::yield_now().await;
            }
            seen
        })
    };

    writer.await.unwrap();
    let seen = reader.await.unwrap();

    // a reader never goes backwards
    assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(seen.iter().all(|v| (1..=11).contains(v)));
}

#[tokio::test]
async fn observers_see_every_committed_version() {
    let harness = Harness::new(Arc::new(InMemoryIdentityStore::new()));
    let ada = profile("ada");
    harness
        .coordinator
        .open(&ada, TasteDomain::Space)
        .await
        .unwrap();
    let mut observer = harness.coordinator.subscribe(&ada).await.unwrap();

    harness
        .recorder
        .handle(
            record(&ada, "oak-shelf", DecisionAction::Aligned, None),
            CommandMetadata::new(),
        )
        .await
        .unwrap();

    observer.changed().await.unwrap();
    assert_eq!(observer.borrow().version().as_u32(), 2);
}

// ════════════════════════════════════════════════════════════════════════════════
// Replay
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn replay_reproduces_the_streamed_vector() {
    let streamed = Harness::new(Arc::new(InMemoryIdentityStore::new()));
    let ada = profile("ada");

    let decisions = [
        ("chrome-stool", DecisionAction::NotForMe),
        ("linen-sofa", DecisionAction::Bought),
        ("oak-shelf", DecisionAction::Aligned),
        ("linen-sofa", DecisionAction::Aligned),
    ];
    let mut last = None;
    for (offset, (id, action)) in decisions.into_iter().enumerate() {
        last = Some(
            streamed
                .recorder
                .handle(record(&ada, id, action, at(offset as i64)), CommandMetadata::new())
                .await
                .unwrap()
                .identity,
        );
    }
    let last = last.unwrap();

    // a fresh process over the same log, with nothing persisted
    let rebuilt = Harness::with_log(Arc::new(InMemoryIdentityStore::new()), streamed.log.clone());
    let outcome = ReplayHistoryHandler::new(rebuilt.coordinator.clone())
        .handle(
            ReplayHistoryCommand {
                profile_id: ada.clone(),
                domain: TasteDomain::Space,
            },
            CommandMetadata::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.applied, 4);
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.identity.version(), last.version());
    assert_eq!(outcome.identity.vector(), last.vector());
    assert_eq!(outcome.identity.stability(), last.stability());
}

#[tokio::test]
async fn unknown_items_are_logged_but_not_applied() {
    let harness = Harness::new(Arc::new(InMemoryIdentityStore::new()));
    let ada = profile("ada");

    let err = harness
        .recorder
        .handle(
            record(&ada, "discontinued-lamp", DecisionAction::Bought, at(0)),
            CommandMetadata::new(),
        )
        .await;
    assert!(err.is_err());
    assert_eq!(harness.log.events_for(&ada).await.unwrap().len(), 1);

    let outcome = harness
        .coordinator
        .replay_history(&ada, TasteDomain::Space)
        .await
        .unwrap();
    assert_eq!(outcome.applied, 0);
    assert_eq!(outcome.skipped, vec![item("discontinued-lamp")]);
}

// ════════════════════════════════════════════════════════════════════════════════
// Filesystem persistence
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn identity_survives_a_restart() {
    let data_dir = TempDir::new().unwrap();
    let ada = profile("ada");

    let before = {
        let harness = Harness::new(Arc::new(FsIdentityStore::new(data_dir.path())));
        for (offset, action) in [DecisionAction::Bought, DecisionAction::Aligned]
            .into_iter()
            .enumerate()
        {
            harness
                .recorder
                .handle(
                    record(&ada, "oak-shelf", action, at(offset as i64)),
                    CommandMetadata::new(),
                )
                .await
                .unwrap();
        }
        harness.coordinator.current(&ada).await.unwrap()
    };

    let harness = Harness::new(Arc::new(FsIdentityStore::new(data_dir.path())));
    let reopened = harness
        .coordinator
        .open(&ada, TasteDomain::Space)
        .await
        .unwrap();
    assert_eq!(*reopened, *before);

    // and keeps counting from where it left off
    let next = harness
        .recorder
        .handle(
            record(&ada, "linen-sofa", DecisionAction::Aligned, at(10)),
            CommandMetadata::new(),
        )
        .await
        .unwrap();
    assert!(next.persisted);
    assert_eq!(next.identity.version().as_u32(), 4);
}

#[tokio::test]
async fn replay_overwrites_a_stale_file() {
    let data_dir = TempDir::new().unwrap();
    let store = Arc::new(FsIdentityStore::new(data_dir.path()));
    let ada = profile("ada");

    let harness = Harness::new(store.clone());
    for offset in 0..3 {
        harness
            .recorder
            .handle(
                record(&ada, "linen-sofa", DecisionAction::Bought, at(offset)),
                CommandMetadata::new(),
            )
            .await
            .unwrap();
    }
    let replayed = harness
        .coordinator
        .replay_history(&ada, TasteDomain::Space)
        .await
        .unwrap();

    assert!(replayed.persisted);
    let stored = store.load(&ada).await.unwrap().unwrap();
    assert_eq!(stored.id(), replayed.identity.id());
    assert_eq!(stored.version().as_u32(), 4);
}

/// Filesystem store that drops its next write on the floor.
struct FlakyFsStore {
    inner: FsIdentityStore,
    fail_next: AtomicBool,
}

impl FlakyFsStore {
    fn check(&self) -> Result<(), DomainError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::StorageError, "disk full"));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityPersistence for FlakyFsStore {
    async fn load(&self, profile_id: &ProfileId) -> Result<Option<TasteIdentity>, DomainError> {
        self.inner.load(profile_id).await
    }

    async fn save(&self, identity: &TasteIdentity) -> Result<(), DomainError> {
        self.check()?;
        self.inner.save(identity).await
    }

    async fn replace(&self, identity: &TasteIdentity) -> Result<(), DomainError> {
        self.check()?;
        self.inner.replace(identity).await
    }
}

#[tokio::test]
async fn a_missed_save_is_repaired_by_the_next_decision() {
    let data_dir = TempDir::new().unwrap();
    let ada = profile("ada");

    let before = {
        let store = Arc::new(FlakyFsStore {
            inner: FsIdentityStore::new(data_dir.path()),
            fail_next: AtomicBool::new(true),
        });
        let harness = Harness::new(store);
        let mut versions = Vec::new();
        for (offset, id) in ["linen-sofa", "oak-shelf", "linen-sofa"].into_iter().enumerate() {
            let result = harness
                .recorder
                .handle(
                    record(&ada, id, DecisionAction::Bought, at(offset as i64)),
                    CommandMetadata::new(),
                )
                .await
                .unwrap();
            versions.push((result.identity.version().as_u32(), result.persisted));
        }
        assert_eq!(versions, vec![(2, false), (3, true), (4, true)]);
        harness.coordinator.current(&ada).await.unwrap()
    };

    let harness = Harness::new(Arc::new(FsIdentityStore::new(data_dir.path())));
    let reopened = harness
        .coordinator
        .open(&ada, TasteDomain::Space)
        .await
        .unwrap();
    assert_eq!(*reopened, *before);
}

// ════════════════════════════════════════════════════════════════════════════════
// Telemetry
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn telemetry_reaches_the_sink() {
    let (queue, receiver) = TelemetryQueue::bounded(64);
    let sink = Arc::new(InMemoryTelemetrySink::new());
    let mut worker = TelemetryWorker::new(receiver, sink.clone());

    let coordinator = Arc::new(
        IdentityCoordinator::new(
            Arc::new(InMemoryIdentityStore::new()),
            catalog(),
            Arc::new(InMemoryDecisionLog::new()),
        )
            .with_telemetry(queue),
    );
    let recorder = RecordDecisionHandler::new(coordinator.clone());
    let ada = profile("ada");

    recorder
        .handle(
            record(&ada, "oak-shelf", DecisionAction::Bought, None),
            CommandMetadata::new(),
        )
        .await
        .unwrap();
    coordinator.evaluate_catalog(&ada, None).await.unwrap();

    let stats = worker.process_pending().await;
    assert_eq!(stats.failed, 0);
    assert!(sink.has_event("identity_created"));
    assert!(sink.has_event("identity_updated"));
    assert_eq!(sink.events_of_type("object_evaluated").len(), 3);
}
