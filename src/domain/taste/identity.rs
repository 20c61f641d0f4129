//! TasteIdentity aggregate and its version value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    ProfileId, TasteIdentityId, Timestamp, UnitInterval, ValidationError,
};

use super::{TasteDomain, TasteVector};

/// Stability assigned to a brand new identity.
pub const INITIAL_STABILITY: f64 = 0.5;

/// Identity version: starts at 1 and only ever moves up by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IdentityVersion(u32);

impl IdentityVersion {
    /// Create initial version (1)
    pub fn initial() -> Self {
        Self(1)
    }

    /// Create from value
    pub fn from_u32(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            Err(ValidationError::invalid_format(
                "version",
                "identity version must be greater than 0",
            ))
        } else {
            Ok(Self(value))
        }
    }

    /// Next version.
    ///
    /// `u32::MAX` is a hard ceiling: the version stops there and stores
    /// refuse the repeated value (see `check_successor`).
    pub fn increment(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for IdentityVersion {
    fn default() -> Self {
        Self::initial()
    }
}

impl TryFrom<u32> for IdentityVersion {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value)
    }
}

impl From<IdentityVersion> for u32 {
    fn from(version: IdentityVersion) -> Self {
        version.0
    }
}

impl fmt::Display for IdentityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A user's versioned, evolving preference model.
///
/// Never mutated in place: every committed update produces a new value via
/// [`TasteIdentity::next_revision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteIdentity {
    id: TasteIdentityId,
    profile_id: ProfileId,
    vector: TasteVector,
    version: IdentityVersion,
    stability: UnitInterval,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TasteIdentity {
    /// A zero-vector identity at version 1 with neutral stability.
    pub fn fresh(profile_id: ProfileId, domain: TasteDomain, timestamp: Timestamp) -> Self {
        Self::fresh_with_vector(profile_id, TasteVector::zero(domain), timestamp)
    }

    /// A version 1 identity around a caller-supplied (usually zero) vector.
    pub fn fresh_with_vector(
        profile_id: ProfileId,
        vector: TasteVector,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: TasteIdentityId::new(),
            profile_id,
            vector,
            version: IdentityVersion::initial(),
            stability: UnitInterval::new(INITIAL_STABILITY),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstitutes an identity from stored parts.
    pub fn restore(
        id: TasteIdentityId,
        profile_id: ProfileId,
        vector: TasteVector,
        version: IdentityVersion,
        stability: f64,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            profile_id,
            vector,
            version,
            stability: UnitInterval::new(stability),
            created_at,
            updated_at,
        }
    }

    /// The successor of this identity: same owner, version + 1.
    pub fn next_revision(
        &self,
        vector: TasteVector,
        stability: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: self.id,
            profile_id: self.profile_id.clone(),
            vector,
            version: self.version.increment(),
            stability: UnitInterval::new(stability),
            created_at: self.created_at,
            updated_at: timestamp,
        }
    }

    pub fn id(&self) -> TasteIdentityId {
        self.id
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn vector(&self) -> &TasteVector {
        &self.vector
    }

    pub fn domain(&self) -> TasteDomain {
        self.vector.domain()
    }

    pub fn version(&self) -> IdentityVersion {
        self.version
    }

    pub fn stability(&self) -> UnitInterval {
        self.stability
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_profile() -> ProfileId {
        ProfileId::new("ada").unwrap()
    }

    fn test_timestamp() -> Timestamp {
        Timestamp::from_unix_secs(1704326400) // 2024-01-04
    }

    #[test]
    fn version_initial_is_one() {
        assert_eq!(IdentityVersion::initial().as_u32(), 1);
    }

    #[test]
    fn version_rejects_zero() {
        assert!(IdentityVersion::from_u32(0).is_err());
        assert_eq!(IdentityVersion::from_u32(42).unwrap().as_u32(), 42);
        assert!(serde_json::from_str::<IdentityVersion>("0").is_err());
    }

    #[test]
    fn version_increments_by_one() {
        let v1 = IdentityVersion::initial();
        assert_eq!(v1.increment().as_u32(), 2);
        assert_eq!(v1.increment().increment().as_u32(), 3);
    }

    #[test]
    fn version_stops_at_the_ceiling() {
        let top = IdentityVersion::from_u32(u32::MAX).unwrap();
        assert_eq!(top.increment(), top);
    }

    #[test]
    fn fresh_identity_is_neutral() {
        let identity = TasteIdentity::fresh(test_profile(), TasteDomain::Space, test_timestamp());

        assert_eq!(identity.version(), IdentityVersion::initial());
        assert_eq!(identity.stability().value(), INITIAL_STABILITY);
        assert!(identity.vector().is_zero());
        assert_eq!(identity.created_at(), identity.updated_at());
        assert_eq!(identity.domain(), TasteDomain::Space);
    }

    #[test]
    fn next_revision_keeps_identity_and_bumps_version() {
        let ts2 = test_timestamp().plus_secs(60);
        let identity = TasteIdentity::fresh(test_profile(), TasteDomain::Art, test_timestamp());
        let vector = identity.vector().clone().with_weight("abstract", 0.2);

        let next = identity.next_revision(vector, 0.9, ts2);

        assert_eq!(next.id(), identity.id());
        assert_eq!(next.profile_id(), identity.profile_id());
        assert_eq!(next.version().as_u32(), 2);
        assert_eq!(next.updated_at(), ts2);
        assert_eq!(next.created_at(), identity.created_at());
        assert!(identity.vector().is_zero(), "source identity must be untouched");
    }

    #[test]
    fn restore_clamps_stability() {
        let identity = TasteIdentity::restore(
            TasteIdentityId::new(),
            test_profile(),
            TasteVector::zero(TasteDomain::Objects),
            IdentityVersion::from_u32(7).unwrap(),
            1.8,
            test_timestamp(),
            test_timestamp(),
        );
        assert_eq!(identity.stability().value(), 1.0);
    }

    #[test]
    fn identity_survives_json() {
        let identity = TasteIdentity::fresh(test_profile(), TasteDomain::Space, test_timestamp());
        let json = serde_json::to_string(&identity).unwrap();
        let back: TasteIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }
}
