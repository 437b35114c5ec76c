use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use notary_value::Binary;
use rand::RngCore;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::error::SsmError;
use crate::protocol::SecurityModule;
use crate::state::{self, SsmEvent, SsmState};

type Seed = Zeroizing<[u8; 32]>;

/// The active writing protocol (spec.md §6): Ed25519 signatures, SHA-512
/// digests. Grounded on the BaaLS `PublicKey`/`TransactionSignature`
/// wrapper-around-`ed25519_dalek` pattern and on the `devsyrem-coldstar`
/// signer's `OsRng.fill_bytes` + `SigningKey::from_bytes(&seed)` generation
/// idiom. Private seeds are held in `Zeroizing` buffers, following
/// `chronx_crypto::KeyPair`'s zeroize-the-secret-on-drop discipline.
#[derive(Debug)]
pub struct V2Ssm {
    state: SsmState,
    current: Option<(Seed, VerifyingKey)>,
    previous: Option<(Seed, VerifyingKey)>,
}

impl V2Ssm {
    pub fn new() -> Self {
        Self { state: SsmState::Keyless, current: None, previous: None }
    }

    /// Restores an SSM instance from persisted key material (used by
    /// `notary-ssm::config` when loading `ssm.bali`).
    pub fn restore(
        state: SsmState,
        current: Option<([u8; 32], [u8; 32])>,
        previous: Option<([u8; 32], [u8; 32])>,
    ) -> Result<Self, SsmError> {
        let load = |pair: ([u8; 32], [u8; 32])| -> Result<(Seed, VerifyingKey), SsmError> {
            let (seed, public_bytes) = pair;
            let verifying = VerifyingKey::from_bytes(&public_bytes)
                .map_err(|e| SsmError::Unexpected(format!("invalid persisted public key: {e}")))?;
            Ok((Zeroizing::new(seed), verifying))
        };
        Ok(Self {
            state,
            current: current.map(load).transpose()?,
            previous: previous.map(load).transpose()?,
        })
    }

    pub fn state(&self) -> SsmState {
        self.state
    }

    /// Current key material as raw bytes, for persistence only.
    pub fn persisted_current(&self) -> Option<([u8; 32], [u8; 32])> {
        self.current.as_ref().map(|(seed, vk)| (**seed, vk.to_bytes()))
    }

    pub fn persisted_previous(&self) -> Option<([u8; 32], [u8; 32])> {
        self.previous.as_ref().map(|(seed, vk)| (**seed, vk.to_bytes()))
    }

    pub fn generate_keys(&mut self) -> Result<Binary, SsmError> {
        self.state = state::transition(self.state, SsmEvent::GenerateKeys)?;
        let (seed, verifying) = generate_keypair();
        let public = verifying.to_bytes().to_vec();
        self.current = Some((seed, verifying));
        Ok(Binary::new(public))
    }

    pub fn rotate_keys(&mut self) -> Result<Binary, SsmError> {
        self.state = state::transition(self.state, SsmEvent::RotateKeys)?;
        let current = self.current.take().expect("loneKey implies a current key exists");
        self.previous = Some(current);
        let (seed, verifying) = generate_keypair();
        let public = verifying.to_bytes().to_vec();
        self.current = Some((seed, verifying));
        Ok(Binary::new(public))
    }

    /// Implements the key-selection rule of spec.md §4.1: if a previous key
    /// exists, sign with it and consume it (one-shot use); otherwise sign
    /// with the current key. This is what makes a new certificate's
    /// signature chain back to the key it replaces.
    pub fn sign_bytes(&mut self, bytes: &[u8]) -> Result<Binary, SsmError> {
        self.state = state::transition(self.state, SsmEvent::SignBytes)?;

        let (seed, _) = if let Some(previous) = self.previous.take() {
            previous
        } else {
            self.current
                .as_ref()
                .map(|(seed, vk)| (seed.clone(), *vk))
                .ok_or_else(|| SsmError::Unexpected("signBytes with no key material".to_string()))?
        };

        let signing_key = SigningKey::from_bytes(&seed);
        let signature = signing_key.sign(bytes);
        Ok(Binary::new(signature.to_bytes().to_vec()))
    }
}

impl SecurityModule for V2Ssm {
    fn protocol(&self) -> &'static str {
        "v2"
    }

    fn digest_bytes(&self, bytes: &[u8]) -> Binary {
        Binary::new(Sha512::digest(bytes).to_vec())
    }

    fn valid_signature(&self, public_key: &Binary, signature: &Binary, bytes: &[u8]) -> bool {
        verify(public_key, signature, bytes)
    }
}

/// Standalone so `notary-ssm`'s facade can verify against a public key that
/// did not come from `self` (e.g. the previous certificate's key in a chain
/// check) without constructing a whole `V2Ssm`.
pub fn verify(public_key: &Binary, signature: &Binary, bytes: &[u8]) -> bool {
    let Ok(pk_bytes): Result<[u8; 32], _> = public_key.as_bytes().try_into() else {
        return false;
    };
    let Ok(sig_bytes): Result<[u8; 64], _> = signature.as_bytes().try_into() else {
        return false;
    };
    let Ok(verifying) = VerifyingKey::from_bytes(&pk_bytes) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);
    verifying.verify(bytes, &signature).is_ok()
}

fn generate_keypair() -> (Seed, VerifyingKey) {
    let mut seed_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
    let seed = Zeroizing::new(seed_bytes);
    let signing_key = SigningKey::from_bytes(&seed);
    (seed, signing_key.verifying_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let mut ssm = V2Ssm::new();
        let public = ssm.generate_keys().unwrap();
        let signature = ssm.sign_bytes(b"a notarized document").unwrap();
        assert!(verify(&public, &signature, b"a notarized document"));
    }

    #[test]
    fn cross_key_rejection() {
        let mut a = V2Ssm::new();
        let pk_a = a.generate_keys().unwrap();
        let sig_a = a.sign_bytes(b"payload").unwrap();

        let mut b = V2Ssm::new();
        let pk_b = b.generate_keys().unwrap();
        let _ = pk_a;

        assert!(!verify(&pk_b, &sig_a, b"payload"));
    }

    #[test]
    fn digest_is_deterministic_and_content_sensitive() {
        let ssm = V2Ssm::new();
        let d1 = ssm.digest_bytes(b"hello");
        let d2 = ssm.digest_bytes(b"hello");
        let d3 = ssm.digest_bytes(b"hellp");
        assert_eq!(d1, d2);
        assert_ne!(d1, d3);
    }

    #[test]
    fn rotate_then_sign_consumes_the_previous_key_once() {
        let mut ssm = V2Ssm::new();
        let pk1 = ssm.generate_keys().unwrap();
        let pk2 = ssm.rotate_keys().unwrap();

        // First signBytes after rotation uses the *previous* key (pk1).
        let sig = ssm.sign_bytes(b"chain-link").unwrap();
        assert!(verify(&pk1, &sig, b"chain-link"));
        assert!(!verify(&pk2, &sig, b"chain-link"));

        // Second call has nothing previous left, so it uses the current key (pk2).
        let sig2 = ssm.sign_bytes(b"self-sign").unwrap();
        assert!(verify(&pk2, &sig2, b"self-sign"));
    }
}
