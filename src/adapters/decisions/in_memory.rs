//! In-memory, append-only decision log.
//!
//! Can be seeded from a JSON-lines file (one decision event per line) so the
//! binary and demos can replay recorded histories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};
use crate::domain::taste::DecisionEvent;
use crate::ports::DecisionEventSource;

/// Append-only log of decisions grouped by profile.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDecisionLog {
    events: Arc<RwLock<HashMap<ProfileId, Vec<DecisionEvent>>>>,
}

impl InMemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON-lines file. Blank lines are skipped; any other line that
    /// does not parse fails the whole load with its line number.
    pub async fn from_jsonl_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::new(
                ErrorCode::DecisionLogUnavailable,
                format!("Failed to read decision log: {}", e),
            )
            .with_detail("path", path.display().to_string())
        })?;

        let log = Self::new();
        for (index, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let event: DecisionEvent = serde_json::from_str(line).map_err(|e| {
                DomainError::new(
                    ErrorCode::DecisionLogUnavailable,
                    format!("Invalid decision on line {}: {}", index + 1, e),
                )
                .with_detail("path", path.display().to_string())
            })?;
            log.append(&event).await?;
        }
        Ok(log)
    }

    /// Profiles with at least one decision, sorted.
    pub async fn profiles(&self) -> Vec<ProfileId> {
        let mut profiles: Vec<ProfileId> = self.events.read().await.keys().cloned().collect();
        profiles.sort();
        profiles
    }

    /// Total number of recorded decisions
    pub async fn event_count(&self) -> usize {
        self.events.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl DecisionEventSource for InMemoryDecisionLog {
    async fn events_for(&self, profile_id: &ProfileId) -> Result<Vec<DecisionEvent>, DomainError> {
        Ok(self
            .events
            .read()
            .await
            .get(profile_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, event: &DecisionEvent) -> Result<(), DomainError> {
        self.events
            .write()
            .await
            .entry(event.profile_id().clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CatalogItemId, Timestamp};
    use crate::domain::taste::DecisionAction;
    use std::io::Write;

    fn event(profile: &str, item: &str, secs: i64) -> DecisionEvent {
        DecisionEvent::new(
            ProfileId::new(profile).unwrap(),
            CatalogItemId::new(item).unwrap(),
            DecisionAction::Aligned,
            Timestamp::from_unix_secs(secs),
        )
    }

    #[tokio::test]
    async fn append_keeps_log_order_per_profile() {
        let log = InMemoryDecisionLog::new();
        let late = event("ada", "lamp", 20);
        let early = event("ada", "rug", 10);
        log.append(&late).await.unwrap();
        log.append(&event("mo", "print", 5)).await.unwrap();
        log.append(&early).await.unwrap();

        let events = log.events_for(&ProfileId::new("ada").unwrap()).await.unwrap();
        assert_eq!(events, vec![late, early]);
        assert_eq!(log.event_count().await, 3);
        assert_eq!(log.profiles().await.len(), 2);
    }

    #[tokio::test]
    async fn unknown_profile_has_empty_history() {
        let log = InMemoryDecisionLog::new();
        let events = log.events_for(&ProfileId::new("nobody").unwrap()).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn loads_json_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"profile_id":"ada","item_id":"lamp","action":"bought","occurred_at":"2024-01-04T10:00:00Z"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"profile_id":"ada","item_id":"rug","action":"notForMe","occurred_at":"2024-01-04T09:00:00Z"}}"#
        )
        .unwrap();

        let log = InMemoryDecisionLog::from_jsonl_file(file.path()).await.unwrap();
        let events = log.events_for(&ProfileId::new("ada").unwrap()).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].action(), DecisionAction::NotForMe);
    }

    #[tokio::test]
    async fn bad_line_reports_its_number() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"profile_id":"ada","item_id":"lamp","action":"bought","occurred_at":"2024-01-04T10:00:00Z"}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"profile_id":"ada","action":"maybe"}}"#).unwrap();

        let err = InMemoryDecisionLog::from_jsonl_file(file.path()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DecisionLogUnavailable);
        assert!(err.message().contains("line 2"));
    }
}
