mod error;
mod key;

pub use error::ParseDidError;
pub use key::{KeyType, PublicKey};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

/// A Decentralised Identifier (Did).
#[derive(Clone, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Did {
    /// The `key` method, which embeds the issuer's public key.
    Key(PublicKey),

    /// Any other method.
    ///
    /// These are carried verbatim and can only be turned into a public key by a custom key resolver.
    Other { method: String, identifier: String },
}

impl Did {
    /// Constructs a Did for the `key` method.
    pub fn key(public_key: PublicKey) -> Self {
        Self::Key(public_key)
    }

    /// The public key embedded in this Did, if any.
    pub fn public_key(&self) -> Option<&PublicKey> {
        match self {
            Self::Key(public_key) => Some(public_key),
            Self::Other { .. } => None,
        }
    }

    /// The method of this Did.
    pub fn method(&self) -> &str {
        match self {
            Self::Key(_) => "key",
            Self::Other { method, .. } => method,
        }
    }
}

impl From<PublicKey> for Did {
    fn from(public_key: PublicKey) -> Self {
        Self::Key(public_key)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Did::Key(public_key) => write!(f, "did:key:{}", key::format(public_key)),
            Did::Other { method, identifier } => write!(f, "did:{method}:{identifier}"),
        }
    }
}

impl FromStr for Did {
    type Err = ParseDidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("did:").ok_or(ParseDidError::NoDid)?;
        let (method, identifier) = s.split_once(':').ok_or(ParseDidError::NoMethod)?;
        let valid_method = !method.is_empty() && method.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !valid_method {
            return Err(ParseDidError::InvalidMethod(method.to_string()));
        }
        if identifier.is_empty() || identifier.ends_with(':') {
            return Err(ParseDidError::InvalidIdentifier);
        }
        match method {
            "key" => Ok(Self::Key(key::parse(identifier)?)),
            _ => Ok(Self::Other { method: method.to_string(), identifier: identifier.to_string() }),
        }
    }
}
