//! The Security Module (spec.md §4.1): owns one Ed25519 key pair (and,
//! during a rotation, one previous pair) on behalf of a single notary
//! instance, produces public keys, digests and signs bytes, and verifies
//! signatures. The sole component in this workspace that ever touches
//! private key material.

pub mod config;
pub mod error;
pub mod protocol;
pub mod state;

use notary_store::ConfigStore;
use notary_value::{Binary, Catalog, Tag};
use tracing::{info, warn};

pub use error::SsmError;
pub use protocol::{v1, v2, SecurityModule, SsmInstance};
pub use state::SsmState;

/// The persisted, key-owning SSM facade. Grounded on
/// `chronx_state::engine::StateEngine`'s order of operations: validate the
/// in-memory state, do the cryptographic work, persist, log, return.
pub struct Ssm<S: ConfigStore> {
    store: S,
    tag: Tag,
    instance: v2::V2Ssm,
}

impl<S: ConfigStore> Ssm<S> {
    /// Loads the SSM's persisted configuration, or initializes a fresh
    /// `keyless` instance with a newly-generated tag if none exists yet
    /// (spec.md §4.1: "the next call re-derives `$tag`... and `$state =
    /// keyless`").
    pub async fn load(store: S) -> Result<Self, SsmError> {
        match store.load().await? {
            Some(text) => {
                let catalog = Catalog::parse(&text)
                    .map_err(|e| SsmError::Unexpected(format!("corrupt SSM config: {e}")))?;
                let loaded = config::from_catalog(&catalog)?;
                Ok(Self { store, tag: loaded.tag, instance: loaded.instance })
            }
            None => {
                let ssm = Self { store, tag: Tag::generate(), instance: v2::V2Ssm::new() };
                ssm.persist().await?;
                Ok(ssm)
            }
        }
    }

    async fn persist(&self) -> Result<(), SsmError> {
        let catalog = config::to_catalog(&self.tag, &self.instance);
        self.store.store(&catalog.to_canonical_text()).await?;
        Ok(())
    }

    pub fn get_tag(&self) -> Tag {
        self.tag.clone()
    }

    pub fn get_protocol(&self) -> &'static str {
        self.instance.protocol()
    }

    pub fn get_state(&self) -> SsmState {
        self.instance.state()
    }

    pub async fn generate_keys(&mut self) -> Result<Binary, SsmError> {
        let public = self.instance.generate_keys()?;
        self.persist().await?;
        info!(tag = %self.tag, "SSM generated a new key pair");
        Ok(public)
    }

    pub async fn rotate_keys(&mut self) -> Result<Binary, SsmError> {
        let public = self.instance.rotate_keys()?;
        self.persist().await?;
        info!(tag = %self.tag, "SSM rotated to a new key pair");
        Ok(public)
    }

    pub async fn sign_bytes(&mut self, bytes: &[u8]) -> Result<Binary, SsmError> {
        let signature = self.instance.sign_bytes(bytes)?;
        self.persist().await?;
        Ok(signature)
    }

    pub fn digest_bytes(&self, bytes: &[u8]) -> Binary {
        self.instance.digest_bytes(bytes)
    }

    pub fn valid_signature(&self, public_key: &Binary, signature: &Binary, bytes: &[u8]) -> bool {
        self.instance.valid_signature(public_key, signature, bytes)
    }

    /// Wipes the SSM's persisted configuration and returns it to
    /// `uninitialized` (spec.md §4.1: "the next call re-derives `$tag`...").
    /// Idempotent.
    pub async fn erase_keys(&mut self) -> Result<(), SsmError> {
        self.store.delete().await?;
        self.tag = Tag::generate();
        self.instance = v2::V2Ssm::new();
        warn!("SSM configuration erased");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notary_store::FileConfigStore;
    use std::path::PathBuf;

    struct TempDir(PathBuf);
    impl TempDir {
        fn new(label: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "notary-ssm-test-{label}-{}-{:?}",
                std::process::id(),
                std::time::Instant::now()
            ));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }
    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn store_in(dir: &TempDir) -> FileConfigStore {
        FileConfigStore::new(&dir.0, "ssm.bali")
    }

    #[tokio::test]
    async fn fresh_load_starts_keyless_and_persists_immediately() {
        let dir = TempDir::new("fresh");
        let ssm = Ssm::load(store_in(&dir)).await.unwrap();
        assert_eq!(ssm.get_state(), SsmState::Keyless);
        assert!(dir.0.join("ssm.bali").exists());
    }

    #[tokio::test]
    async fn generate_sign_and_verify_round_trip_across_reload() {
        let dir = TempDir::new("roundtrip");
        let mut ssm = Ssm::load(store_in(&dir)).await.unwrap();
        let public = ssm.generate_keys().await.unwrap();
        let signature = ssm.sign_bytes(b"payload").await.unwrap();
        assert!(ssm.valid_signature(&public, &signature, b"payload"));

        let reloaded = Ssm::load(store_in(&dir)).await.unwrap();
        assert_eq!(reloaded.get_state(), SsmState::LoneKey);
        assert!(reloaded.valid_signature(&public, &signature, b"payload"));
    }

    #[tokio::test]
    async fn illegal_event_leaves_state_unchanged() {
        let dir = TempDir::new("illegal");
        let mut ssm = Ssm::load(store_in(&dir)).await.unwrap();
        assert!(ssm.rotate_keys().await.is_err());
        assert_eq!(ssm.get_state(), SsmState::Keyless);
    }

    #[tokio::test]
    async fn erase_keys_wipes_the_file_and_resets_tag() {
        let dir = TempDir::new("erase");
        let mut ssm = Ssm::load(store_in(&dir)).await.unwrap();
        let original_tag = ssm.get_tag();
        ssm.generate_keys().await.unwrap();
        ssm.erase_keys().await.unwrap();

        assert!(!dir.0.join("ssm.bali").exists());
        assert_eq!(ssm.get_state(), SsmState::Keyless);
        assert_ne!(ssm.get_tag(), original_tag);
    }
}
