//! Filesystem identity persistence.
//!
//! One JSON file per profile: `{data_dir}/identities/{profile}.json`. Each
//! file is an envelope holding the serialized identity and its SHA-256
//! checksum, verified on every load.
//!
//! Saves go to a temporary file first and are renamed into place, so a
//! crash at any point leaves either the previous version or the new one,
//! never a partial file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};
use crate::domain::taste::TasteIdentity;
use crate::ports::{check_successor, IdentityPersistence};

const ENVELOPE_FORMAT: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct IdentityEnvelope {
    format: u32,
    checksum: String,
    payload: String,
}

/// Filesystem-based identity storage.
pub struct FsIdentityStore {
    base_dir: PathBuf,
    // serializes read-compare-write within this process
    write_lock: Mutex<()>,
}

impl FsIdentityStore {
    /// Create new filesystem storage with base directory
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Full path of the record for a profile
    pub fn record_path(&self, profile_id: &ProfileId) -> PathBuf {
        self.base_dir
            .join("identities")
            .join(format!("{}.json", file_stem(profile_id)))
    }

    /// Hex SHA-256 of a payload
    pub fn compute_checksum(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    async fn ensure_dir_exists(&self, path: &Path) -> Result<(), DomainError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(format!("Failed to create directory: {}", e)))?;
        }
        Ok(())
    }

    async fn read_record(&self, profile_id: &ProfileId) -> Result<Option<TasteIdentity>, DomainError> {
        let path = self.record_path(profile_id);

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(format!("Failed to read file: {}", e))),
        };

        let envelope: IdentityEnvelope = serde_json::from_str(&raw)
            .map_err(|e| corrupt(&path, format!("unreadable envelope: {}", e)))?;

        if envelope.format != ENVELOPE_FORMAT {
            return Err(corrupt(&path, format!("unsupported format {}", envelope.format)));
        }
        if Self::compute_checksum(&envelope.payload) != envelope.checksum {
            return Err(corrupt(&path, "checksum mismatch".to_string()));
        }

        let identity: TasteIdentity = serde_json::from_str(&envelope.payload)
            .map_err(|e| corrupt(&path, format!("unreadable identity: {}", e)))?;

        if identity.profile_id() != profile_id {
            return Err(corrupt(
                &path,
                format!("record belongs to profile {}", identity.profile_id()),
            ));
        }

        Ok(Some(identity))
    }

    async fn write_record(&self, identity: &TasteIdentity) -> Result<(), DomainError> {
        let file_path = self.record_path(identity.profile_id());
        self.ensure_dir_exists(&file_path).await?;

        let payload = serde_json::to_string(identity)
            .map_err(|e| storage_error(format!("Failed to serialize identity: {}", e)))?;
        let envelope = IdentityEnvelope {
            format: ENVELOPE_FORMAT,
            checksum: Self::compute_checksum(&payload),
            payload,
        };
        let content = serde_json::to_string_pretty(&envelope)
            .map_err(|e| storage_error(format!("Failed to serialize envelope: {}", e)))?;

        let temp_path = file_path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .await
            .map_err(|e| storage_error(format!("Failed to write temporary file: {}", e)))?;

        // Rename to final location (atomic operation on Unix)
        fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| storage_error(format!("Failed to rename file: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl IdentityPersistence for FsIdentityStore {
    async fn load(&self, profile_id: &ProfileId) -> Result<Option<TasteIdentity>, DomainError> {
        self.read_record(profile_id).await
    }

    async fn save(&self, identity: &TasteIdentity) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        let stored = self.read_record(identity.profile_id()).await?;
        check_successor(stored.as_ref(), identity)?;
        self.write_record(identity).await
    }

    async fn replace(&self, identity: &TasteIdentity) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        self.write_record(identity).await
    }
}

/// Profile ids are opaque strings; anything outside `[A-Za-z0-9._-]` is
/// percent-encoded so the id maps to exactly one plain file name.
fn file_stem(profile_id: &ProfileId) -> String {
    let mut stem = String::with_capacity(profile_id.as_str().len());
    for byte in profile_id.as_str().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => stem.push(byte as char),
            b'.' if !stem.is_empty() => stem.push('.'),
            _ => stem.push_str(&format!("%{:02X}", byte)),
        }
    }
    stem
}

fn storage_error(message: String) -> DomainError {
    DomainError::new(ErrorCode::StorageError, message)
}

fn corrupt(path: &Path, reason: String) -> DomainError {
    DomainError::new(
        ErrorCode::CorruptRecord,
        format!("Corrupt identity record: {}", reason),
    )
    .with_detail("path", path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::taste::{TasteDomain, TasteVector};
    use tempfile::TempDir;

    fn profile() -> ProfileId {
        ProfileId::new("ada@example.com").unwrap()
    }

    fn fresh() -> TasteIdentity {
        TasteIdentity::fresh_with_vector(
            profile(),
            TasteVector::zero(TasteDomain::Art)
                .with_weight("surreal", 0.4)
                .with_avoid("neon"),
            Timestamp::from_unix_secs(1704326400),
        )
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsIdentityStore::new(temp_dir.path());
        let identity = fresh();

        store.save(&identity).await.unwrap();

        let loaded = store.load(&profile()).await.unwrap();
        assert_eq!(loaded, Some(identity));
        assert!(store.record_path(&profile()).exists());
    }

    #[tokio::test]
    async fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsIdentityStore::new(temp_dir.path());
        assert!(store.load(&profile()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_successive_versions() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsIdentityStore::new(temp_dir.path());
        let v1 = fresh();
        let v2 = v1.next_revision(v1.vector().clone().with_weight("abstract", -0.3), 0.8, Timestamp::now());

        store.save(&v1).await.unwrap();
        store.save(&v2).await.unwrap();

        let loaded = store.load(&profile()).await.unwrap().unwrap();
        assert_eq!(loaded.version().as_u32(), 2);
        assert_eq!(loaded.vector().weight("abstract").unwrap().value(), -0.3);
        assert!(!store.record_path(&profile()).with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_version_conflict_leaves_record_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsIdentityStore::new(temp_dir.path());
        let v1 = fresh();
        store.save(&v1).await.unwrap();

        let skipped = v1
            .next_revision(v1.vector().clone(), 0.5, Timestamp::now())
            .next_revision(v1.vector().clone(), 0.5, Timestamp::now());
        let err = store.save(&skipped).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.load(&profile()).await.unwrap(), Some(v1));
    }

    #[tokio::test]
    async fn test_tampered_payload_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsIdentityStore::new(temp_dir.path());
        store.save(&fresh()).await.unwrap();

        let path = store.record_path(&profile());
        let raw = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, raw.replace("surreal", "abstract")).unwrap();

        let err = store.load(&profile()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CorruptRecord);
    }

    #[tokio::test]
    async fn test_truncated_file_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsIdentityStore::new(temp_dir.path());
        store.save(&fresh()).await.unwrap();

        let path = store.record_path(&profile());
        std::fs::write(&path, "{\"format\": 1, \"checks").unwrap();

        let err = store.load(&profile()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CorruptRecord);
    }

    #[tokio::test]
    async fn test_stray_temp_file_does_not_shadow_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsIdentityStore::new(temp_dir.path());
        let v1 = fresh();
        store.save(&v1).await.unwrap();

        // a crash between write and rename leaves only the temp file behind
        let temp_path = store.record_path(&profile()).with_extension("json.tmp");
        std::fs::write(&temp_path, "partial").unwrap();

        assert_eq!(store.load(&profile()).await.unwrap(), Some(v1));
    }

    #[test]
    fn test_compute_checksum() {
        let checksum = FsIdentityStore::compute_checksum("test content");
        assert_eq!(checksum, FsIdentityStore::compute_checksum("test content"));
        assert_ne!(checksum, FsIdentityStore::compute_checksum("different content"));
        assert_eq!(checksum.len(), 64);
    }

    #[test]
    fn test_file_stem_escapes_separators() {
        let id = ProfileId::new("../ada/x").unwrap();
        let stem = file_stem(&id);
        assert!(!stem.contains('/'));
        assert!(!stem.starts_with('.'));
        assert_eq!(file_stem(&ProfileId::new("ada-1").unwrap()), "ada-1");
    }
}
