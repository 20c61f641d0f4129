//! IdentityPersistence port - durable storage of taste identities.
//!
//! One record per profile holds the latest committed version.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};
use crate::domain::taste::TasteIdentity;

/// Port for loading and saving identity snapshots.
///
/// Implementations must ensure:
/// - `save` is all-or-nothing; a failed save leaves the previous version loadable
/// - `save` only succeeds when the identity's version is exactly one above the
///   stored version of the same identity (or nothing is stored yet), returning
///   `ErrorCode::VersionConflict` otherwise
/// - corrupt records surface as `ErrorCode::CorruptRecord`, never as a silent miss
#[async_trait]
pub trait IdentityPersistence: Send + Sync {
    /// Latest committed identity for the profile, if any.
    async fn load(&self, profile_id: &ProfileId) -> Result<Option<TasteIdentity>, DomainError>;

    /// Stores a new version, replacing the previous one atomically.
    async fn save(&self, identity: &TasteIdentity) -> Result<(), DomainError>;

    /// Overwrites whatever is stored, skipping the version check.
    ///
    /// Used when an identity is rebuilt from the decision log (the rebuilt
    /// identity carries a new identifier and restarts its own version count),
    /// and to catch the store up after a best-effort save failed.
    async fn replace(&self, identity: &TasteIdentity) -> Result<(), DomainError>;
}

/// Compare-and-swap rule shared by the persistence adapters.
///
/// `incoming` must be the direct successor of `stored`: same identity id and
/// version exactly one higher. The first save of a profile always succeeds,
/// since fresh identities are not written until their first update.
pub fn check_successor(
    stored: Option<&TasteIdentity>,
    incoming: &TasteIdentity,
) -> Result<(), DomainError> {
    let Some(stored) = stored else {
        return Ok(());
    };
    let Some(expected) = stored.version().as_u32().checked_add(1) else {
        return Err(DomainError::new(
            ErrorCode::VersionConflict,
            format!(
                "Profile {} is at the version ceiling {}",
                incoming.profile_id(),
                stored.version()
            ),
        )
        .with_detail("profile_id", incoming.profile_id().as_str()));
    };

    if incoming.version().as_u32() == expected && stored.id() == incoming.id() {
        return Ok(());
    }

    Err(DomainError::new(
        ErrorCode::VersionConflict,
        format!(
            "Cannot store {} for profile {}: expected v{}",
            incoming.version(),
            incoming.profile_id(),
            expected
        ),
    )
    .with_detail("profile_id", incoming.profile_id().as_str())
    .with_detail("expected_version", expected.to_string())
    .with_detail("actual_version", incoming.version().as_u32().to_string()))
}
