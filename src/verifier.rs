use crate::{
    did::{Did, KeyType, PublicKey},
    ucan::Ucan,
};
use async_trait::async_trait;
use rsa::{pkcs1::DecodeRsaPublicKey, Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};
use signature::Verifier;
use std::{fmt, str::FromStr};
use tracing::debug;

/// A signature algorithm, as named in a token header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JwtAlgorithm {
    /// Ed25519 signatures.
    EdDSA,

    /// ECDSA over NIST P-256 with SHA-256.
    ES256,

    /// ECDSA over secp256k1 with SHA-256.
    ES256K,

    /// RSASSA-PKCS1-v1_5 with SHA-256.
    RS256,
}

impl JwtAlgorithm {
    /// The type of key this algorithm verifies with.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::EdDSA => KeyType::Ed25519,
            Self::ES256 => KeyType::P256,
            Self::ES256K => KeyType::Secp256k1,
            Self::RS256 => KeyType::Rsa,
        }
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EdDSA => "EdDSA",
            Self::ES256 => "ES256",
            Self::ES256K => "ES256K",
            Self::RS256 => "RS256",
        };
        write!(f, "{text}")
    }
}

impl FromStr for JwtAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EdDSA" => Ok(Self::EdDSA),
            "ES256" => Ok(Self::ES256),
            "ES256K" => Ok(Self::ES256K),
            "RS256" => Ok(Self::RS256),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Resolves the public key that verifies signatures made by a Did.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Resolve the public key for a Did.
    async fn resolve_key(&self, did: &Did) -> Result<PublicKey, SignatureError>;
}

/// A key resolver for the `did:key` method, which carries the key in the identifier itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct DidKeyResolver;

#[async_trait]
impl KeyResolver for DidKeyResolver {
    async fn resolve_key(&self, did: &Did) -> Result<PublicKey, SignatureError> {
        did.public_key().cloned().ok_or_else(|| SignatureError::UnresolvableIssuer(did.to_string()))
    }
}

/// Check the signature of a token against its issuer's key.
pub async fn check_signature(ucan: &Ucan, resolver: &dyn KeyResolver) -> Result<(), SignatureError> {
    let algorithm: JwtAlgorithm = ucan.algorithm().parse()?;
    let signature = ucan.signature().ok_or(SignatureError::MissingSignature)?;
    let public_key = resolver.resolve_key(ucan.issuer()).await?;
    debug!("Verifying {algorithm} signature by {}", ucan.issuer());
    verify(algorithm, &public_key, ucan.signed_data().as_bytes(), signature)
}

/// Verify a signature over a message.
pub fn verify(
    algorithm: JwtAlgorithm,
    public_key: &PublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), SignatureError> {
    match (algorithm, public_key) {
        (JwtAlgorithm::EdDSA, PublicKey::Ed25519(key)) => {
            let key = ed25519_dalek::VerifyingKey::from_bytes(key).map_err(|_| SignatureError::InvalidPublicKey)?;
            let signature =
                ed25519_dalek::Signature::from_slice(signature).map_err(|_| SignatureError::MalformedSignature)?;
            key.verify(message, &signature).map_err(|_| SignatureError::InvalidSignature)
        }
        (JwtAlgorithm::ES256, PublicKey::P256(key)) => {
            let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(key).map_err(|_| SignatureError::InvalidPublicKey)?;
            let signature =
                p256::ecdsa::Signature::from_slice(signature).map_err(|_| SignatureError::MalformedSignature)?;
            key.verify(message, &signature).map_err(|_| SignatureError::InvalidSignature)
        }
        (JwtAlgorithm::ES256K, PublicKey::Secp256k1(key)) => {
            let key = k256::ecdsa::VerifyingKey::from_sec1_bytes(key).map_err(|_| SignatureError::InvalidPublicKey)?;
            let signature =
                k256::ecdsa::Signature::from_slice(signature).map_err(|_| SignatureError::MalformedSignature)?;
            key.verify(message, &signature).map_err(|_| SignatureError::InvalidSignature)
        }
        (JwtAlgorithm::RS256, PublicKey::Rsa(key)) => {
            let key = RsaPublicKey::from_pkcs1_der(key).map_err(|_| SignatureError::InvalidPublicKey)?;
            let hashed = Sha256::digest(message);
            key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature).map_err(|_| SignatureError::InvalidSignature)
        }
        (algorithm, public_key) => {
            Err(SignatureError::AlgorithmKeyMismatch { algorithm, key_type: public_key.key_type() })
        }
    }
}

/// An error during the verification of a token signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("algorithm {algorithm} cannot be used with {key_type} keys")]
    AlgorithmKeyMismatch { algorithm: JwtAlgorithm, key_type: KeyType },

    #[error("cannot resolve a public key for {0}")]
    UnresolvableIssuer(String),

    #[error("invalid issuer public key")]
    InvalidPublicKey,

    #[error("malformed signature")]
    MalformedSignature,

    #[error("token is not signed")]
    MissingSignature,

    #[error("invalid signature")]
    InvalidSignature,
}
