use crate::{
    builder::UcanBuildError, codec::DecodeError, content_id::UnsupportedHashAlgorithm, did::ParseDidError,
    signer::SigningError, validator::ValidationError, verifier::SignatureError,
};

/// An error returned by the top level token operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed token: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnsupportedHashAlgorithm(#[from] UnsupportedHashAlgorithm),

    #[error("invalid DID: {0}")]
    Did(#[from] ParseDidError),

    #[error("building token: {0}")]
    Build(#[from] UcanBuildError),

    #[error("signing token: {0}")]
    Signing(#[from] SigningError),
}
