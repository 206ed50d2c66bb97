use crate::{
    did::Did,
    keypair::{Keypair, SecretKey},
    verifier::JwtAlgorithm,
};
use async_trait::async_trait;
use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256};
use signature::Signer as _;

/// A UCAN token signer.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The DID of this signer.
    fn did(&self) -> &Did;

    /// The algorithm the signatures this signer creates are verified with.
    fn algorithm(&self) -> JwtAlgorithm;

    /// Sign the given bytes.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError>;
}

/// An error that can occur when signing a UCAN token.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("token is already signed")]
    AlreadySigned,

    #[error("signer {0} is not the token issuer")]
    IssuerMismatch(String),

    #[error("signer algorithm {0} does not match the token header")]
    AlgorithmMismatch(String),
}

/// A signer that uses a local keypair.
pub struct KeypairSigner {
    keypair: Keypair,
    did: Did,
}

impl KeypairSigner {
    pub(crate) fn new(keypair: Keypair) -> Self {
        let did = Did::key(keypair.public_key().clone());
        Self { keypair, did }
    }
}

#[async_trait]
impl Signer for KeypairSigner {
    fn did(&self) -> &Did {
        &self.did
    }

    fn algorithm(&self) -> JwtAlgorithm {
        self.keypair.algorithm()
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        let failed = |e: signature::Error| SigningError::SigningFailed(e.to_string());
        let signature = match self.keypair.secret_key() {
            SecretKey::Ed25519(key) => key.try_sign(message).map_err(failed)?.to_bytes().to_vec(),
            SecretKey::Secp256k1(key) => {
                let signature: k256::ecdsa::Signature = key.try_sign(message).map_err(failed)?;
                signature.to_bytes().to_vec()
            }
            SecretKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key.try_sign(message).map_err(failed)?;
                signature.to_bytes().to_vec()
            }
            SecretKey::Rsa(key) => {
                let hashed = Sha256::digest(message);
                key.sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)
                    .map_err(|e| SigningError::SigningFailed(e.to_string()))?
            }
        };
        Ok(signature)
    }
}
