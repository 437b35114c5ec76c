pub mod v1;
pub mod v2;

use notary_value::Binary;

use crate::error::SsmError;
use crate::state::SsmState;

/// The capability set every protocol variant exposes (spec.md §9 REDESIGN
/// FLAGS: "a sum type of protocol variants with a common capability set").
/// Dispatch on [`SsmInstance`] matches on the variant tag rather than going
/// through `dyn` dispatch, per the same flag's instruction.
pub trait SecurityModule {
    fn protocol(&self) -> &'static str;
    fn digest_bytes(&self, bytes: &[u8]) -> Binary;
    fn valid_signature(&self, public_key: &Binary, signature: &Binary, bytes: &[u8]) -> bool;
}

/// The stateful, key-owning sum type backing the SSM facade. Only the `V2`
/// variant ever generates, rotates or signs in this codebase — `v2` is the
/// active writing protocol (spec.md §6); `V1` exists solely so legacy
/// documents remain verifiable.
#[derive(Debug)]
pub enum SsmInstance {
    V2(v2::V2Ssm),
    V1(v1::V1Ssm),
}

impl SsmInstance {
    pub fn fresh_v2() -> Self {
        SsmInstance::V2(v2::V2Ssm::new())
    }

    pub fn v1_verifier() -> Self {
        SsmInstance::V1(v1::V1Ssm)
    }

    pub fn key_state(&self) -> SsmState {
        match self {
            SsmInstance::V2(ssm) => ssm.state(),
            SsmInstance::V1(_) => SsmState::Keyless,
        }
    }

    pub fn generate_keys(&mut self) -> Result<Binary, SsmError> {
        match self {
            SsmInstance::V2(ssm) => ssm.generate_keys(),
            SsmInstance::V1(_) => Err(SsmError::LegacyProtocolReadOnly),
        }
    }

    pub fn rotate_keys(&mut self) -> Result<Binary, SsmError> {
        match self {
            SsmInstance::V2(ssm) => ssm.rotate_keys(),
            SsmInstance::V1(_) => Err(SsmError::LegacyProtocolReadOnly),
        }
    }

    pub fn sign_bytes(&mut self, bytes: &[u8]) -> Result<Binary, SsmError> {
        match self {
            SsmInstance::V2(ssm) => ssm.sign_bytes(bytes),
            SsmInstance::V1(_) => Err(SsmError::LegacyProtocolReadOnly),
        }
    }
}

impl SecurityModule for SsmInstance {
    fn protocol(&self) -> &'static str {
        match self {
            SsmInstance::V2(ssm) => ssm.protocol(),
            SsmInstance::V1(ssm) => ssm.protocol(),
        }
    }

    fn digest_bytes(&self, bytes: &[u8]) -> Binary {
        match self {
            SsmInstance::V2(ssm) => ssm.digest_bytes(bytes),
            SsmInstance::V1(ssm) => ssm.digest_bytes(bytes),
        }
    }

    fn valid_signature(&self, public_key: &Binary, signature: &Binary, bytes: &[u8]) -> bool {
        match self {
            SsmInstance::V2(ssm) => ssm.valid_signature(public_key, signature, bytes),
            SsmInstance::V1(ssm) => ssm.valid_signature(public_key, signature, bytes),
        }
    }
}
