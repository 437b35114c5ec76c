use notary_value::{Binary, Catalog, Tag, Value};

use crate::error::SsmError;
use crate::protocol::v2::V2Ssm;
use crate::state::SsmState;

/// Builds the SSM's persisted catalog (spec.md §6, "SSM file"): `$tag`,
/// `$state`, `$publicKey`, `$privateKey`, and — only while a rotation is in
/// flight — `$previousPublicKey`/`$previousPrivateKey`.
pub fn to_catalog(tag: &Tag, ssm: &V2Ssm) -> Catalog {
    let mut catalog = Catalog::new()
        .with_attribute("$tag", tag.clone())
        .with_attribute("$state", Value::Text(ssm.state().to_text().to_string()));

    if let Some((private, public)) = ssm.persisted_current() {
        catalog.set_attribute("$publicKey", Binary::new(public.to_vec()));
        catalog.set_attribute("$privateKey", Binary::new(private.to_vec()));
    }
    if let Some((private, public)) = ssm.persisted_previous() {
        catalog.set_attribute("$previousPublicKey", Binary::new(public.to_vec()));
        catalog.set_attribute("$previousPrivateKey", Binary::new(private.to_vec()));
    }
    catalog
}

pub struct LoadedSsm {
    pub tag: Tag,
    pub state: SsmState,
    pub instance: V2Ssm,
}

pub fn from_catalog(catalog: &Catalog) -> Result<LoadedSsm, SsmError> {
    let tag = expect_tag(catalog, "$tag")?;
    let state_text = expect_text(catalog, "$state")?;
    let state = SsmState::parse(&state_text)
        .ok_or_else(|| SsmError::Unexpected(format!("unknown SSM state {state_text:?}")))?;

    let current = match (catalog.attribute("$privateKey"), catalog.attribute("$publicKey")) {
        (Some(_), Some(_)) => Some((expect_key(catalog, "$privateKey")?, expect_key(catalog, "$publicKey")?)),
        _ => None,
    };
    let previous = match (
        catalog.attribute("$previousPrivateKey"),
        catalog.attribute("$previousPublicKey"),
    ) {
        (Some(_), Some(_)) => Some((
            expect_key(catalog, "$previousPrivateKey")?,
            expect_key(catalog, "$previousPublicKey")?,
        )),
        _ => None,
    };

    let instance = V2Ssm::restore(state, current, previous)?;
    Ok(LoadedSsm { tag, state, instance })
}

fn expect_tag(catalog: &Catalog, name: &str) -> Result<Tag, SsmError> {
    match catalog.require_attribute(name).map_err(|e| SsmError::Unexpected(e.to_string()))? {
        Value::Tag(t) => Ok(t.clone()),
        other => Err(SsmError::Unexpected(format!("{name} is not a tag: {other:?}"))),
    }
}

fn expect_text(catalog: &Catalog, name: &str) -> Result<String, SsmError> {
    match catalog.require_attribute(name).map_err(|e| SsmError::Unexpected(e.to_string()))? {
        Value::Text(s) => Ok(s.clone()),
        other => Err(SsmError::Unexpected(format!("{name} is not text: {other:?}"))),
    }
}

fn expect_key(catalog: &Catalog, name: &str) -> Result<[u8; 32], SsmError> {
    match catalog.require_attribute(name).map_err(|e| SsmError::Unexpected(e.to_string()))? {
        Value::Binary(b) => b
            .as_bytes()
            .try_into()
            .map_err(|_| SsmError::Unexpected(format!("{name} is not 32 bytes"))),
        other => Err(SsmError::Unexpected(format!("{name} is not binary: {other:?}"))),
    }
}
