use crate::{codec::DecodeError, verifier::SignatureError};
use std::fmt;

/// An error during the validation of a token.
///
/// Only the first failure found is reported. Signature checks run first, then temporal checks, then
/// the proof chain.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("token expired at {expires_at}, current time is {now}")]
    Expired { expires_at: u64, now: u64 },

    #[error("token is not valid before {not_before}, current time is {now}")]
    TooEarly { not_before: u64, now: u64 },

    #[error("invalid proof chain: {0}")]
    Chain(#[from] ChainError),
}

impl ValidationError {
    /// The kind of validation that was violated.
    pub fn kind(&self) -> ValidationKind {
        match self {
            Self::Signature(_) => ValidationKind::Signature,
            Self::Expired { .. } => ValidationKind::Expired,
            Self::TooEarly { .. } => ValidationKind::TooEarly,
            Self::Chain(_) => ValidationKind::Chain,
        }
    }
}

/// A kind of validation that was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationKind {
    Signature,
    Expired,
    TooEarly,
    Chain,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ValidationKind::*;
        let text = match self {
            Signature => "invalid signature",
            Expired => "token is expired",
            TooEarly => "`not before` date not met",
            Chain => "broken delegation chain",
        };
        write!(f, "{text}")
    }
}

/// An error in a token's delegation chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("proof not found: {0}")]
    ProofNotFound(String),

    #[error("invalid proof reference: {0}")]
    InvalidReference(String),

    #[error("malformed proof {reference}: {source}")]
    MalformedProof { reference: String, source: DecodeError },

    #[error("looking up proof {reference} failed: {message}")]
    Resolver { reference: String, message: String },

    #[error("proof {0} does not hash to its reference")]
    ProofMismatch(String),

    #[error("proof {reference} is delegated to {audience}, not to {issuer}")]
    ProofChainBroken { reference: String, audience: String, issuer: String },

    #[error("invalid signature on proof {reference}: {source}")]
    ProofSignature { reference: String, source: SignatureError },

    #[error("proof {0} is expired")]
    ProofExpired(String),

    #[error("proof {0} is not valid yet")]
    ProofTooEarly(String),

    #[error("lifetime of proof {0} does not cover the delegated token")]
    LifetimeExceeded(String),

    #[error("chain is deeper than max allowed: {0}")]
    ChainTooDeep(usize),
}
