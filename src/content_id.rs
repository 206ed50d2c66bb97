use cid::Cid;
use multihash::{Code, MultihashDigest};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

/// The multicodec for raw binary content.
pub const RAW_CODEC: u64 = 0x55;

/// A hash function used to compute content identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum HashAlgorithm {
    #[default]
    Sha2_256,
    Sha2_512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Keccak224,
    Keccak256,
    Keccak384,
    Keccak512,
    Blake2b256,
    Blake2b512,
    Blake2s128,
    Blake2s256,
    Blake3_256,
}

impl HashAlgorithm {
    /// All supported hash functions.
    pub const ALL: [HashAlgorithm; 15] = [
        Self::Sha2_256,
        Self::Sha2_512,
        Self::Sha3_224,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
        Self::Keccak224,
        Self::Keccak256,
        Self::Keccak384,
        Self::Keccak512,
        Self::Blake2b256,
        Self::Blake2b512,
        Self::Blake2s128,
        Self::Blake2s256,
        Self::Blake3_256,
    ];

    /// The name this hash function is selected by.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha2_256 => "SHA2-256",
            Self::Sha2_512 => "SHA2-512",
            Self::Sha3_224 => "SHA3-224",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_384 => "SHA3-384",
            Self::Sha3_512 => "SHA3-512",
            Self::Keccak224 => "Keccak-224",
            Self::Keccak256 => "Keccak-256",
            Self::Keccak384 => "Keccak-384",
            Self::Keccak512 => "Keccak-512",
            Self::Blake2b256 => "BLAKE2b-256",
            Self::Blake2b512 => "BLAKE2b-512",
            Self::Blake2s128 => "BLAKE2s-128",
            Self::Blake2s256 => "BLAKE2s-256",
            Self::Blake3_256 => "BLAKE3-256",
        }
    }

    /// Look up the hash function for a multihash code.
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|algorithm| u64::from(algorithm.code()) == code)
    }

    /// Compute the CIDv1 of the given bytes, using the raw codec.
    pub fn cid(&self, bytes: &[u8]) -> Cid {
        Cid::new_v1(RAW_CODEC, self.code().digest(bytes))
    }

    fn code(&self) -> Code {
        match self {
            Self::Sha2_256 => Code::Sha2_256,
            Self::Sha2_512 => Code::Sha2_512,
            Self::Sha3_224 => Code::Sha3_224,
            Self::Sha3_256 => Code::Sha3_256,
            Self::Sha3_384 => Code::Sha3_384,
            Self::Sha3_512 => Code::Sha3_512,
            Self::Keccak224 => Code::Keccak224,
            Self::Keccak256 => Code::Keccak256,
            Self::Keccak384 => Code::Keccak384,
            Self::Keccak512 => Code::Keccak512,
            Self::Blake2b256 => Code::Blake2b256,
            Self::Blake2b512 => Code::Blake2b512,
            Self::Blake2s128 => Code::Blake2s128,
            Self::Blake2s256 => Code::Blake2s256,
            Self::Blake3_256 => Code::Blake3_256,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnsupportedHashAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|algorithm| algorithm.name() == s).ok_or_else(|| UnsupportedHashAlgorithm(s.into()))
    }
}

/// A hash function name that is not supported.
#[derive(Debug, thiserror::Error)]
#[error("unsupported hash algorithm: {0}")]
pub struct UnsupportedHashAlgorithm(pub String);
