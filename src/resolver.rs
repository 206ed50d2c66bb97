use crate::{
    codec::DecodeError,
    content_id::{HashAlgorithm, RAW_CODEC},
    ucan::Ucan,
};
use async_trait::async_trait;
use cid::Cid;
use std::{collections::HashMap, str::FromStr};
use tracing::debug;

/// A reference to a proof, as found in a token's `prf` field.
#[derive(Clone, Debug, PartialEq)]
pub enum ProofReference {
    /// The content identifier of the proof's encoded form.
    Cid(Cid),

    /// The proof itself, in its encoded form.
    Inline(String),
}

impl ProofReference {
    /// The hash function a CID reference was computed with.
    pub fn hasher(&self) -> Result<Option<HashAlgorithm>, ProofResolveError> {
        match self {
            Self::Cid(cid) => HashAlgorithm::from_code(cid.hash().code())
                .map(Some)
                .ok_or_else(|| ProofResolveError::InvalidReference(cid.to_string())),
            Self::Inline(_) => Ok(None),
        }
    }
}

impl FromStr for ProofReference {
    type Err = ProofResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('.') {
            return Ok(Self::Inline(s.to_string()));
        }
        let cid = Cid::try_from(s).map_err(|_| ProofResolveError::InvalidReference(s.to_string()))?;
        if cid.codec() != RAW_CODEC {
            return Err(ProofResolveError::InvalidReference(s.to_string()));
        }
        Ok(Self::Cid(cid))
    }
}

/// Looks up the proofs referenced by a token.
#[async_trait]
pub trait ProofResolver: Send + Sync {
    /// Resolve a proof reference into the token it refers to.
    async fn resolve(&self, reference: &ProofReference) -> Result<Ucan, ProofResolveError>;
}

/// A resolver that only understands proofs that are inlined in the reference itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineProofResolver;

#[async_trait]
impl ProofResolver for InlineProofResolver {
    async fn resolve(&self, reference: &ProofReference) -> Result<Ucan, ProofResolveError> {
        match reference {
            ProofReference::Inline(token) => Ok(Ucan::decode(token)?),
            ProofReference::Cid(cid) => Err(ProofResolveError::NotFound(cid.to_string())),
        }
    }
}

/// An in memory set of proofs, indexed by their content identifier.
///
/// Inlined references are decoded directly and never touch the store.
#[derive(Clone, Debug, Default)]
pub struct ProofStore {
    tokens: HashMap<Cid, Ucan>,
}

impl ProofStore {
    /// Add a token to this store, indexed by its CID under the default hash function.
    pub fn insert(&mut self, ucan: Ucan) -> Cid {
        self.insert_with(ucan, HashAlgorithm::default())
    }

    /// Add a token to this store, indexed by its CID under the given hash function.
    pub fn insert_with(&mut self, ucan: Ucan, hasher: HashAlgorithm) -> Cid {
        let cid = ucan.to_cid(hasher);
        self.tokens.insert(cid, ucan);
        cid
    }

    /// Get a token by its CID.
    pub fn get(&self, cid: &Cid) -> Option<&Ucan> {
        self.tokens.get(cid)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl ProofResolver for ProofStore {
    async fn resolve(&self, reference: &ProofReference) -> Result<Ucan, ProofResolveError> {
        match reference {
            ProofReference::Inline(_) => InlineProofResolver.resolve(reference).await,
            ProofReference::Cid(cid) => {
                debug!("Looking up proof {cid}");
                self.get(cid).cloned().ok_or_else(|| ProofResolveError::NotFound(cid.to_string()))
            }
        }
    }
}

/// An error when resolving a proof.
#[derive(Debug, thiserror::Error)]
pub enum ProofResolveError {
    #[error("proof not found: {0}")]
    NotFound(String),

    #[error("invalid proof reference: {0}")]
    InvalidReference(String),

    #[error("malformed proof: {0}")]
    Malformed(#[from] DecodeError),

    #[error("proof lookup failed: {0}")]
    Lookup(String),
}
