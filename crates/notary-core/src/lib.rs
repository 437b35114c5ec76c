//! The Digital Notary facade (spec.md §4.2): drives a [`notary_ssm::Ssm`]
//! through the `limited → pending → enabled` lifecycle, assembles
//! certificates, notarized documents and citations, and persists its own
//! configuration alongside the SSM's.

pub mod certificate;
pub mod citation;
pub mod config;
pub mod document;
pub mod error;
pub mod registry;
pub mod state;

use notary_ssm::{SecurityModule, Ssm};
use notary_store::ConfigStore;
use notary_value::{Catalog, Moment, Tag, Value, Version};
use tracing::{info, warn};

pub use certificate::Certificate;
pub use citation::{Citation, CitationSlot};
pub use document::NotarizedDocument;
pub use error::NotaryError;
pub use registry::ProtocolRegistry;
pub use state::{NotaryEvent, NotaryState};

/// Owns one [`Ssm`] plus its own persisted configuration. Single notary per
/// process, no internal lock (spec.md §5): concurrent invocation against the
/// same configuration directory is undefined behavior.
pub struct DigitalNotary<S: ConfigStore> {
    ssm: Ssm<S>,
    store: S,
    registry: ProtocolRegistry,
    state: NotaryState,
    certificate: Option<Catalog>,
    citation: Option<Catalog>,
}

impl<S: ConfigStore> DigitalNotary<S> {
    pub async fn load(ssm_store: S, notary_store: S) -> Result<Self, NotaryError> {
        let ssm = Ssm::load(ssm_store).await?;

        let (state, certificate, citation) = match notary_store.load().await? {
            Some(text) => {
                let catalog = Catalog::parse(&text)?;
                let loaded = config::from_catalog(&catalog)?;
                (loaded.state, loaded.certificate, loaded.citation)
            }
            None => (NotaryState::Limited, None, None),
        };

        let notary = Self {
            ssm,
            store: notary_store,
            registry: ProtocolRegistry::standard(),
            state,
            certificate,
            citation,
        };
        notary.persist().await?;
        Ok(notary)
    }

    async fn persist(&self) -> Result<(), NotaryError> {
        let catalog = config::to_catalog(self.state, self.certificate.as_ref(), self.citation.as_ref());
        self.store.store(&catalog.to_canonical_text()).await?;
        Ok(())
    }

    fn active_protocol(&self) -> Version {
        Version::parse(self.registry.active_protocol()).expect("registry protocol names are always well-formed")
    }

    pub fn state(&self) -> NotaryState {
        self.state
    }

    pub fn citation(&self) -> Option<&Catalog> {
        self.citation.as_ref()
    }

    /// `limited → pending`. Wraps the SSM's new public key into an unsigned
    /// certificate component with a freshly generated lineage `$tag`.
    pub async fn generate_key(&mut self) -> Result<Catalog, NotaryError> {
        let next_state = state::transition(self.state, NotaryEvent::GenerateKey)?;

        let public_key = self.ssm.generate_keys().await?;
        let protocol = self.active_protocol();
        let account = self.ssm.get_tag();
        let tag = Tag::generate();
        let certificate =
            Certificate::build(&protocol, Moment::now(), account, public_key, tag, Version::initial(), CitationSlot::None);

        self.state = next_state;
        self.certificate = Some(certificate.clone());
        self.persist().await?;
        info!(account = %self.ssm.get_tag(), "notary generated an unsigned certificate");
        Ok(certificate)
    }

    /// `pending → enabled`. `signed_certificate` must be a notarized document
    /// whose `$component` structurally matches the stashed certificate.
    pub async fn activate_key(&mut self, signed_certificate: Catalog) -> Result<Catalog, NotaryError> {
        let next_state = state::transition(self.state, NotaryEvent::ActivateKey)?;

        let stashed = self.certificate.clone().ok_or_else(|| NotaryError::Unexpected {
            module: "notary",
            procedure: "activateKey",
            text: "pending state with no stashed certificate".to_string(),
            cause: None,
        })?;
        let component = NotarizedDocument::component(&signed_certificate)?;
        if component != Value::Catalog(Box::new(stashed)) {
            return Err(NotaryError::InvalidCertificate {
                module: "notary",
                procedure: "activateKey",
                text: "signed certificate's component does not match the stashed certificate".to_string(),
            });
        }

        let (tag, version) = document::NotarizedDocument::component_tag_version(&component)?;
        let digest = self.ssm.digest_bytes(&signed_certificate.to_canonical_bytes());
        let citation = Citation::build(&self.active_protocol(), Moment::now(), tag, version, digest);

        self.state = next_state;
        self.certificate = Some(signed_certificate);
        self.citation = Some(citation.clone());
        self.persist().await?;
        info!("notary activated and is now enabled");
        Ok(citation)
    }

    /// Legal only in `enabled`.
    pub async fn get_citation(&mut self) -> Result<Catalog, NotaryError> {
        state::transition(self.state, NotaryEvent::GetCitation)?;
        self.citation.clone().ok_or_else(|| NotaryError::Unexpected {
            module: "notary",
            procedure: "getCitation",
            text: "enabled state with no stored citation".to_string(),
            cause: None,
        })
    }

    /// Legal in `pending` (self-signing the new certificate) and `enabled`.
    pub async fn notarize_component(&mut self, component: Value) -> Result<Catalog, NotaryError> {
        let next_state = state::transition(self.state, NotaryEvent::NotarizeComponent)?;

        let protocol = self.active_protocol();
        let certificate_slot = match &self.citation {
            Some(c) => CitationSlot::Citation(c.clone()),
            None => CitationSlot::None,
        };
        let unsigned = NotarizedDocument::assemble(component, &protocol, Moment::now(), certificate_slot);
        let signature = self.ssm.sign_bytes(&NotarizedDocument::signable_bytes(&unsigned)).await?;
        let signed = NotarizedDocument::finalize(unsigned, &protocol, signature);

        self.state = next_state;
        self.persist().await?;
        Ok(signed)
    }

    /// Always legal; no state transition. Verifies `document`'s signature
    /// under the public key embedded in `certifying_document`'s component.
    pub fn validate_document(&self, document: &Catalog, certifying_document: &Catalog) -> Result<bool, NotaryError> {
        let certifying_component = NotarizedDocument::component(certifying_document)?;
        let Value::Catalog(certificate) = &certifying_component else {
            return Err(NotaryError::InvalidParameter {
                module: "notary",
                procedure: "validDocument",
                text: "certifying document's component is not a certificate catalog".to_string(),
            });
        };
        let protocol = Certificate::protocol(certificate)?;
        let ssm_instance = self.registry.resolve(&protocol.to_text(), "validDocument")?;

        let public_key = Certificate::public_key(certificate)?;
        let signature = NotarizedDocument::signature(document)?;
        let bytes = NotarizedDocument::signed_payload_bytes(document)?;
        Ok(ssm_instance.valid_signature(&public_key, &signature, &bytes))
    }

    /// Always legal; no state transition. Pure function of `document`.
    pub fn cite_document(&self, document: &Catalog) -> Result<Catalog, NotaryError> {
        let component = NotarizedDocument::component(document)?;
        let (tag, version) = NotarizedDocument::component_tag_version(&component)?;
        let digest = self.ssm.digest_bytes(&document.to_canonical_bytes());
        Ok(Citation::build(&self.active_protocol(), Moment::now(), tag, version, digest))
    }

    /// Always legal; no state transition. Deliberately stricter than "same
    /// document": any reserialization difference mismatches (spec.md §4.2).
    pub fn citation_matches(&self, citation: &Catalog, document: &Catalog) -> Result<bool, NotaryError> {
        let protocol = Citation::protocol(citation)?;
        let ssm_instance = self.registry.resolve(&protocol.to_text(), "citationMatches")?;
        let digest = ssm_instance.digest_bytes(&document.to_canonical_bytes());
        Ok(digest == Citation::digest(citation)?)
    }

    /// `enabled → enabled`. The new certificate's signature chains to the
    /// key it replaces via the SSM's key-selection rule (spec.md §4.1/§4.2
    /// "Chain link").
    pub async fn refresh_key(&mut self) -> Result<Catalog, NotaryError> {
        let next_state = state::transition(self.state, NotaryEvent::RefreshKey)?;

        let current_certificate = self.certificate.clone().ok_or_else(|| NotaryError::Unexpected {
            module: "notary",
            procedure: "refreshKey",
            text: "enabled state with no current certificate".to_string(),
            cause: None,
        })?;
        let current_citation = self.citation.clone().ok_or_else(|| NotaryError::Unexpected {
            module: "notary",
            procedure: "refreshKey",
            text: "enabled state with no current citation".to_string(),
            cause: None,
        })?;

        let current_component = NotarizedDocument::component(&current_certificate)?;
        let Value::Catalog(current_cert) = &current_component else {
            return Err(NotaryError::InvalidCertificate {
                module: "notary",
                procedure: "refreshKey",
                text: "current certificate's component is not a certificate catalog".to_string(),
            });
        };
        let account = Certificate::account(current_cert)?;
        let tag = Certificate::tag(current_cert)?;
        let version = Certificate::version(current_cert)?.next_version();
        let protocol = self.active_protocol();

        let new_public_key = self.ssm.rotate_keys().await?;
        let new_certificate_component = Certificate::build(
            &protocol,
            Moment::now(),
            account,
            new_public_key,
            tag,
            version,
            CitationSlot::Citation(current_citation.clone()),
        );

        let unsigned = NotarizedDocument::assemble(
            Value::Catalog(Box::new(new_certificate_component)),
            &protocol,
            Moment::now(),
            CitationSlot::Citation(current_citation),
        );
        // SSM is now `twoKeys`; its key-selection rule signs with the
        // *previous* key, which is exactly the chain link this operation
        // promises.
        let signature = self.ssm.sign_bytes(&NotarizedDocument::signable_bytes(&unsigned)).await?;
        let signed = NotarizedDocument::finalize(unsigned, &protocol, signature);

        let new_component = NotarizedDocument::component(&signed)?;
        let (cited_tag, cited_version) = NotarizedDocument::component_tag_version(&new_component)?;
        let digest = self.ssm.digest_bytes(&signed.to_canonical_bytes());
        let new_citation = Citation::build(&protocol, Moment::now(), cited_tag, cited_version, digest);

        self.state = next_state;
        self.certificate = Some(signed.clone());
        self.citation = Some(new_citation);
        self.persist().await?;
        info!("notary refreshed its key and chained the new certificate");
        Ok(signed)
    }

    /// Always legal. Returns the notary to `uninitialized`: the next call
    /// starts from `limited`.
    pub async fn forget_key(&mut self) -> Result<(), NotaryError> {
        self.ssm.erase_keys().await?;
        self.store.delete().await?;
        self.state = NotaryState::Limited;
        self.certificate = None;
        self.citation = None;
        warn!("notary configuration erased");
        Ok(())
    }
}
