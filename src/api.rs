//! Top level token operations.
//!
//! These take tokens in their encoded form and run them through the process wide defaults: a
//! decoder with the default size limit and a validator that reads the system clock and resolves
//! `did:key` issuers. Use [`UcanDecoder`] and [`UcanValidator`] directly for anything else.

use crate::{
    builder::UcanBuilder,
    codec::UcanDecoder,
    content_id::HashAlgorithm,
    did::Did,
    error::Error,
    resolver::{InlineProofResolver, ProofResolver},
    signer::Signer,
    token::{Capability, CapabilityMap},
    ucan::Ucan,
    validator::UcanValidator,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

static ENGINE: OnceLock<Engine> = OnceLock::new();

#[derive(Default)]
struct Engine {
    decoder: UcanDecoder,
    validator: UcanValidator,
}

fn engine() -> &'static Engine {
    ENGINE.get_or_init(|| {
        debug!("Initializing token engine");
        Engine::default()
    })
}

/// Set up the process wide defaults.
///
/// Every operation in this module does this on first use, calling it again has no effect.
pub fn init() {
    engine();
}

/// Decode a token.
pub fn decode(token: &str) -> Result<Ucan, Error> {
    Ok(engine().decoder.decode(token)?)
}

/// Validate a token, only following proofs that are inlined in it.
pub async fn validate(token: &str) -> Result<(), Error> {
    validate_with(token, &InlineProofResolver).await
}

/// Validate a token, looking up its proofs through the given resolver.
pub async fn validate_with(token: &str, proofs: &dyn ProofResolver) -> Result<(), Error> {
    let ucan = decode(token)?;
    engine().validator.validate(&ucan, proofs).await?;
    Ok(())
}

/// Check the signature of a token.
pub async fn check_signature(token: &str) -> Result<(), Error> {
    let ucan = decode(token)?;
    crate::verifier::check_signature(&ucan, &crate::verifier::DidKeyResolver).await?;
    Ok(())
}

/// Returns true if the token has expired.
pub fn is_expired(token: &str) -> Result<bool, Error> {
    is_expired_at(token, engine().validator.now())
}

/// Returns true if the token has expired at the given time, in seconds since the unix epoch.
pub fn is_expired_at(token: &str, now: u64) -> Result<bool, Error> {
    Ok(decode(token)?.is_expired(now))
}

/// Returns true if the token is not valid yet.
pub fn is_too_early(token: &str) -> Result<bool, Error> {
    is_too_early_at(token, engine().validator.now())
}

/// Returns true if the token is not valid yet at the given time, in seconds since the unix epoch.
pub fn is_too_early_at(token: &str, now: u64) -> Result<bool, Error> {
    Ok(decode(token)?.is_too_early(now))
}

/// Compute the CID of a token using the named hash function, SHA2-256 if none is given.
pub fn to_cid(token: &str, hasher: Option<&str>) -> Result<String, Error> {
    let hasher = match hasher {
        Some(name) => name.parse::<HashAlgorithm>()?,
        None => HashAlgorithm::default(),
    };
    Ok(decode(token)?.to_cid(hasher).to_string())
}

/// The contents of a token to be built.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// The number of seconds the token is valid for, starting when it's built.
    pub lifetime_in_seconds: Option<u64>,

    /// The timestamp at which the token expires.
    pub expiration: Option<u64>,

    /// The timestamp at which the token becomes valid.
    pub not_before: Option<u64>,

    pub facts: Option<Value>,

    pub proofs: Option<Vec<String>>,

    pub nonce: Option<String>,

    /// Capabilities in the map layout.
    pub capabilities: Option<CapabilityMap>,
}

/// Build an unsigned token issued by the given signer.
///
/// The returned draft can be signed later on via [`Ucan::sign`].
pub fn build(issuer: &impl Signer, audience: &str, options: BuildOptions) -> Result<Ucan, Error> {
    Ok(builder(issuer, audience, options)?.build()?)
}

/// Build a token and sign it.
pub async fn build_signed(issuer: &impl Signer, audience: &str, options: BuildOptions) -> Result<Ucan, Error> {
    Ok(builder(issuer, audience, options)?.sign(issuer).await?)
}

fn builder(issuer: &impl Signer, audience: &str, options: BuildOptions) -> Result<UcanBuilder, Error> {
    let audience: Did = audience.parse()?;
    let BuildOptions { lifetime_in_seconds, expiration, not_before, facts, proofs, nonce, capabilities } = options;

    let mut builder = UcanBuilder::default().issued_by(issuer).for_audience(audience);
    if let Some(lifetime) = lifetime_in_seconds {
        builder = builder.with_lifetime(lifetime);
    }
    if let Some(expiration) = expiration {
        builder = builder.with_expiration(expiration);
    }
    if let Some(not_before) = not_before {
        builder = builder.not_before(not_before);
    }
    if let Some(facts) = facts {
        builder = builder.with_facts(facts);
    }
    if let Some(nonce) = nonce {
        builder = builder.with_nonce(nonce);
    }
    for proof in proofs.into_iter().flatten() {
        builder = builder.with_proof(proof);
    }
    for (resource, abilities) in capabilities.into_iter().flatten() {
        for (ability, caveats) in abilities {
            let capability = Capability { resource: resource.clone(), ability, caveats };
            builder = builder.claiming_capability(capability);
        }
    }
    Ok(builder)
}
