use crate::{
    did::{Did, PublicKey},
    signer::KeypairSigner,
    verifier::JwtAlgorithm,
};
use rsa::{pkcs1::EncodeRsaPublicKey, pkcs8::DecodePrivateKey, RsaPrivateKey};
use std::fmt;

const RSA_KEY_BITS: usize = 2048;

/// A secret key for any of the supported signature algorithms.
#[derive(Clone)]
pub(crate) enum SecretKey {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
    P256(p256::ecdsa::SigningKey),
    Rsa(Box<RsaPrivateKey>),
}

/// A key pair.
///
/// This provides a unified API for managing keys, creating DIDs and generating signers regardless of
/// the underlying algorithm.
#[derive(Clone)]
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Keypair {
    /// Generates a new, random `Keypair` for the given algorithm.
    pub fn generate(algorithm: JwtAlgorithm) -> Result<Self, KeypairError> {
        let mut rng = rand::thread_rng();
        let secret_key = match algorithm {
            JwtAlgorithm::EdDSA => SecretKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut rng)),
            JwtAlgorithm::ES256K => SecretKey::Secp256k1(k256::ecdsa::SigningKey::random(&mut rng)),
            JwtAlgorithm::ES256 => SecretKey::P256(p256::ecdsa::SigningKey::random(&mut rng)),
            JwtAlgorithm::RS256 => {
                let key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).map_err(|_| KeypairError::InvalidSecretKey)?;
                SecretKey::Rsa(Box::new(key))
            }
        };
        Self::from_secret_key(secret_key)
    }

    /// Creates a `Keypair` from a secret key.
    ///
    /// Elliptic curve keys are raw 32 byte scalars, RSA keys are PKCS#8 DER documents.
    pub fn from_bytes(algorithm: JwtAlgorithm, bytes: &[u8]) -> Result<Self, KeypairError> {
        let secret_key = match algorithm {
            JwtAlgorithm::EdDSA => {
                let bytes: &[u8; 32] = bytes.try_into().map_err(|_| KeypairError::InvalidSecretKey)?;
                SecretKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(bytes))
            }
            JwtAlgorithm::ES256K => {
                let key = k256::ecdsa::SigningKey::from_slice(bytes).map_err(|_| KeypairError::InvalidSecretKey)?;
                SecretKey::Secp256k1(key)
            }
            JwtAlgorithm::ES256 => {
                let key = p256::ecdsa::SigningKey::from_slice(bytes).map_err(|_| KeypairError::InvalidSecretKey)?;
                SecretKey::P256(key)
            }
            JwtAlgorithm::RS256 => {
                let key = RsaPrivateKey::from_pkcs8_der(bytes).map_err(|_| KeypairError::InvalidSecretKey)?;
                SecretKey::Rsa(Box::new(key))
            }
        };
        Self::from_secret_key(secret_key)
    }

    fn from_secret_key(secret_key: SecretKey) -> Result<Self, KeypairError> {
        let public_key = match &secret_key {
            SecretKey::Ed25519(key) => PublicKey::Ed25519(key.verifying_key().to_bytes()),
            SecretKey::Secp256k1(key) => {
                let point = key.verifying_key().to_encoded_point(true);
                PublicKey::Secp256k1(point.as_bytes().try_into().map_err(|_| KeypairError::PublicKey)?)
            }
            SecretKey::P256(key) => {
                let point = key.verifying_key().to_encoded_point(true);
                PublicKey::P256(point.as_bytes().try_into().map_err(|_| KeypairError::PublicKey)?)
            }
            SecretKey::Rsa(key) => {
                let document = key.to_public_key().to_pkcs1_der().map_err(|_| KeypairError::PublicKey)?;
                PublicKey::Rsa(document.as_bytes().to_vec())
            }
        };
        Ok(Self { secret_key, public_key })
    }

    /// The algorithm signatures made with this keypair are verified with.
    pub fn algorithm(&self) -> JwtAlgorithm {
        match self.secret_key {
            SecretKey::Ed25519(_) => JwtAlgorithm::EdDSA,
            SecretKey::Secp256k1(_) => JwtAlgorithm::ES256K,
            SecretKey::P256(_) => JwtAlgorithm::ES256,
            SecretKey::Rsa(_) => JwtAlgorithm::RS256,
        }
    }

    /// Returns the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Creates a `did:key` Did from this keypair's public key.
    pub fn to_did(&self) -> Did {
        Did::key(self.public_key.clone())
    }

    /// Creates a signer from this keypair.
    pub fn signer(&self) -> KeypairSigner {
        KeypairSigner::new(self.clone())
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair").field("public_key", &self.public_key).finish_non_exhaustive()
    }
}

/// An error when constructing a keypair.
#[derive(Debug, thiserror::Error)]
pub enum KeypairError {
    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("cannot derive public key")]
    PublicKey,
}
