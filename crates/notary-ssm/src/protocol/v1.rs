use notary_value::Binary;
use p521::ecdsa::{Signature, VerifyingKey};
use sha1::{Digest, Sha1};
use signature::hazmat::PrehashVerifier;

use crate::protocol::SecurityModule;

/// The legacy protocol: secp521r1 ECDSA-with-SHA1 signatures (spec.md §6).
/// Retained only so documents notarized before the v2 migration remain
/// verifiable (§1 Non-goals: "an older v1 encryption path exists but is not
/// part of the contract"). There is no persisted key state for this
/// protocol in this codebase — `notary-core`'s protocol registry constructs
/// a stateless `V1Ssm` purely to check a signature against a public key
/// already embedded in the legacy document.
#[derive(Debug)]
pub struct V1Ssm;

impl SecurityModule for V1Ssm {
    fn protocol(&self) -> &'static str {
        "v1"
    }

    fn digest_bytes(&self, bytes: &[u8]) -> Binary {
        Binary::new(Sha1::digest(bytes).to_vec())
    }

    fn valid_signature(&self, public_key: &Binary, signature: &Binary, bytes: &[u8]) -> bool {
        let Ok(verifying) = VerifyingKey::from_sec1_bytes(public_key.as_bytes()) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature.as_bytes()) else {
            return false;
        };
        let prehash = Sha1::digest(bytes);
        verifying.verify_prehash(&prehash, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let ssm = V1Ssm;
        assert_eq!(ssm.digest_bytes(b"legacy"), ssm.digest_bytes(b"legacy"));
        assert_ne!(ssm.digest_bytes(b"legacy"), ssm.digest_bytes(b"modern"));
    }

    #[test]
    fn malformed_public_key_fails_closed() {
        let ssm = V1Ssm;
        let bogus_key = Binary::new(vec![0u8; 4]);
        let bogus_sig = Binary::new(vec![0u8; 4]);
        assert!(!ssm.valid_signature(&bogus_key, &bogus_sig, b"anything"));
    }
}
