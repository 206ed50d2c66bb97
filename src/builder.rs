use crate::{
    codec::to_base64,
    content_id::HashAlgorithm,
    did::Did,
    signer::{Signer, SigningError},
    token::{capability_map, Capability, JsonObject, UcanHeader, UcanPayload, TOKEN_TYPE, UCAN_VERSION},
    ucan::Ucan,
    verifier::JwtAlgorithm,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

// Helper to simplify unwrapping options in the builder
macro_rules! try_get {
    ($option:ident) => {
        $option.ok_or(UcanBuildError::MissingField(stringify!($option)))
    };
}

const NONCE_LENGTH: usize = 16;

/// A UCAN token builder.
#[derive(Clone, Debug, Default)]
pub struct UcanBuilder {
    issuer: Option<Did>,
    algorithm: Option<JwtAlgorithm>,
    audience: Option<Did>,
    lifetime: Option<u64>,
    expiration: Option<u64>,
    not_before: Option<u64>,
    nonce: Option<String>,
    facts: Option<Value>,
    capabilities: Vec<Capability>,
    proofs: Vec<String>,
}

impl UcanBuilder {
    /// Set the issuer to be the given signer.
    pub fn issued_by(self, signer: &impl Signer) -> Self {
        self.issuer(signer.did().clone(), signer.algorithm())
    }

    /// Set the issuer and the algorithm its signature will use.
    pub fn issuer(mut self, did: Did, algorithm: JwtAlgorithm) -> Self {
        self.issuer = Some(did);
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the audience for this token.
    pub fn for_audience(mut self, did: Did) -> Self {
        self.audience = Some(did);
        self
    }

    /// Make this token expire the given number of seconds after it is built.
    pub fn with_lifetime(mut self, seconds: u64) -> Self {
        self.lifetime = Some(seconds);
        self
    }

    /// Set the expiration timestamp for this token.
    pub fn with_expiration(mut self, timestamp: u64) -> Self {
        self.expiration = Some(timestamp);
        self
    }

    /// Set the expiration time for this token.
    pub fn expires_at(self, timestamp: DateTime<Utc>) -> Self {
        self.with_expiration(epoch_seconds(timestamp))
    }

    /// Set the timestamp when this token first becomes valid.
    pub fn not_before(mut self, timestamp: u64) -> Self {
        self.not_before = Some(timestamp);
        self
    }

    /// Set the nonce for this token.
    pub fn with_nonce<T: Into<String>>(mut self, nonce: T) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Set a random nonce for this token.
    pub fn with_random_nonce(self) -> Self {
        self.with_nonce(to_base64(rand::random::<[u8; NONCE_LENGTH]>()))
    }

    /// Set the facts for this token.
    pub fn with_facts(mut self, facts: Value) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Add a capability to this token.
    pub fn claiming_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Add a list of capabilities to this token.
    pub fn claiming_capabilities<I>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = Capability>,
    {
        self.capabilities.extend(capabilities);
        self
    }

    /// Add a proof reference to this token.
    pub fn with_proof<T: Into<String>>(mut self, reference: T) -> Self {
        self.proofs.push(reference.into());
        self
    }

    /// Use the given token as a proof, referenced by its CID.
    pub fn witnessed_by(self, proof: &Ucan) -> Self {
        let cid = proof.to_cid(HashAlgorithm::default());
        self.with_proof(cid.to_string())
    }

    /// Build an unsigned token.
    pub fn build(self) -> Result<Ucan, UcanBuildError> {
        let Self {
            issuer,
            algorithm,
            audience,
            lifetime,
            expiration,
            not_before,
            nonce,
            facts,
            capabilities,
            proofs,
        } = self;

        let issuer = try_get!(issuer)?;
        let algorithm = try_get!(algorithm)?;
        let audience = try_get!(audience)?;
        let expires_at = match (expiration, lifetime) {
            (Some(_), Some(_)) => return Err(UcanBuildError::ConflictingExpiration),
            (Some(expiration), None) => Some(expiration),
            (None, Some(lifetime)) => Some(epoch_seconds(Utc::now()).saturating_add(lifetime)),
            (None, None) => None,
        };

        let header = UcanHeader {
            algorithm: algorithm.to_string(),
            typ: TOKEN_TYPE.to_string(),
            version: None,
            extra: JsonObject::new(),
        };
        let payload = UcanPayload {
            version: Some(UCAN_VERSION.to_string()),
            issuer,
            audience,
            expires_at,
            not_before,
            nonce,
            facts,
            capabilities: Some(capability_map(capabilities)),
            attenuations: None,
            proofs: (!proofs.is_empty()).then_some(proofs),
            extra: JsonObject::new(),
        };
        Ucan::from_parts(header, payload).map_err(UcanBuildError::Encoding)
    }

    /// Build and sign a token.
    pub async fn sign(self, signer: &impl Signer) -> Result<Ucan, UcanBuildError> {
        let ucan = self.build()?;
        Ok(ucan.sign(signer).await?)
    }
}

fn epoch_seconds(timestamp: DateTime<Utc>) -> u64 {
    u64::try_from(timestamp.timestamp()).unwrap_or_default()
}

/// An error when constructing a token.
#[derive(Debug, thiserror::Error)]
pub enum UcanBuildError {
    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("only one of expiration or lifetime may be set")]
    ConflictingExpiration,

    #[error("encoding token: {0}")]
    Encoding(serde_json::Error),

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),
}
