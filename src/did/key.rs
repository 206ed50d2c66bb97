use super::error::ParseDidError;
use multibase::{encode, Base};
use std::fmt;

const ED25519_PREFIX: [u8; 2] = [0xed, 0x01];
const SECP256K1_PREFIX: [u8; 2] = [0xe7, 0x01];
const P256_PREFIX: [u8; 2] = [0x80, 0x24];
const RSA_PREFIX: [u8; 2] = [0x85, 0x24];

/// A public key embedded in a `did:key` identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    /// A raw 32 byte Ed25519 key.
    Ed25519([u8; 32]),

    /// A compressed SEC1 secp256k1 key.
    Secp256k1([u8; 33]),

    /// A compressed SEC1 NIST P-256 key.
    P256([u8; 33]),

    /// A PKCS#1 DER encoded RSA key.
    Rsa(Vec<u8>),
}

impl PublicKey {
    /// The name of this key's type.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Ed25519(_) => KeyType::Ed25519,
            Self::Secp256k1(_) => KeyType::Secp256k1,
            Self::P256(_) => KeyType::P256,
            Self::Rsa(_) => KeyType::Rsa,
        }
    }

    /// The raw key bytes, without any multicodec prefix.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Ed25519(key) => key,
            Self::Secp256k1(key) | Self::P256(key) => key,
            Self::Rsa(key) => key,
        }
    }

    fn prefix(&self) -> [u8; 2] {
        match self {
            Self::Ed25519(_) => ED25519_PREFIX,
            Self::Secp256k1(_) => SECP256K1_PREFIX,
            Self::P256(_) => P256_PREFIX,
            Self::Rsa(_) => RSA_PREFIX,
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.key_type(), format(self))
    }
}

/// The type of a public key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    Ed25519,
    Secp256k1,
    P256,
    Rsa,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Ed25519 => "ed25519",
            Self::Secp256k1 => "secp256k1",
            Self::P256 => "p256",
            Self::Rsa => "rsa",
        };
        write!(f, "{text}")
    }
}

pub(super) fn format(public_key: &PublicKey) -> String {
    let key = public_key.as_bytes();
    let prefix = public_key.prefix();
    let mut prefixed_key = Vec::with_capacity(prefix.len() + key.len());
    prefixed_key.extend_from_slice(&prefix);
    prefixed_key.extend_from_slice(key);
    encode(Base::Base58Btc, prefixed_key)
}

pub(super) fn parse(s: &str) -> Result<PublicKey, ParseDidError> {
    let (base, input) = multibase::decode(s).map_err(|_| ParseDidError::Multibase)?;
    if base != Base::Base58Btc {
        return Err(ParseDidError::UnsupportedMultibase);
    }
    if input.len() < 2 {
        return Err(ParseDidError::UnsupportedMulticodec);
    }
    let (prefix, key) = input.split_at(2);
    let invalid_length = |_| ParseDidError::InvalidKeyLength;
    match [prefix[0], prefix[1]] {
        ED25519_PREFIX => Ok(PublicKey::Ed25519(key.try_into().map_err(invalid_length)?)),
        SECP256K1_PREFIX => Ok(PublicKey::Secp256k1(key.try_into().map_err(invalid_length)?)),
        P256_PREFIX => Ok(PublicKey::P256(key.try_into().map_err(invalid_length)?)),
        RSA_PREFIX if !key.is_empty() => Ok(PublicKey::Rsa(key.to_vec())),
        RSA_PREFIX => Err(ParseDidError::InvalidKeyLength),
        _ => Err(ParseDidError::UnsupportedMulticodec),
    }
}
