/// An error when parsing a DID.
#[derive(Debug, thiserror::Error)]
pub enum ParseDidError {
    #[error("not a valid Did prefix")]
    NoDid,

    #[error("no Did method")]
    NoMethod,

    #[error("invalid Did method: {0}")]
    InvalidMethod(String),

    #[error("invalid Did method specific identifier")]
    InvalidIdentifier,

    #[error("invalid multibase encoding")]
    Multibase,

    #[error("unsupported multibase encoding, expected base58btc")]
    UnsupportedMultibase,

    #[error("unsupported multicodec, expected one of ed25519-pub, secp256k1-pub, p256-pub, rsa-pub")]
    UnsupportedMulticodec,

    #[error("invalid public key length")]
    InvalidKeyLength,
}
