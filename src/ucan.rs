use crate::{
    canonical::canonical_json,
    codec::{DecodeError, RawUcan, UcanDecoder},
    content_id::HashAlgorithm,
    did::Did,
    signer::{Signer, SigningError},
    token::{Capability, UcanHeader, UcanPayload},
};
use cid::Cid;
use serde_json::Value;
use std::str::FromStr;

/// A UCAN token.
///
/// This is a wrapper over the decoded header and payload along with their raw pieces, so the token
/// can be re-serialized, verified and hashed later on without altering its contents.
#[derive(Clone, Debug, PartialEq)]
pub struct Ucan {
    raw: RawUcan,
    header: UcanHeader,
    payload: UcanPayload,
}

impl Ucan {
    pub(crate) fn from_raw_parts(raw: RawUcan, header: UcanHeader, payload: UcanPayload) -> Self {
        Self { raw, header, payload }
    }

    /// Construct an unsigned token out of a header and a payload.
    ///
    /// Both are serialized in their canonical form.
    pub fn from_parts(header: UcanHeader, payload: UcanPayload) -> Result<Self, serde_json::Error> {
        let raw = RawUcan { header: canonical_json(&header)?, payload: canonical_json(&payload)?, signature: None };
        Ok(Self { raw, header, payload })
    }

    /// Decode a token with the default decoder settings.
    pub fn decode(s: &str) -> Result<Self, DecodeError> {
        UcanDecoder::default().decode(s)
    }

    /// Encode this token.
    pub fn encode(&self) -> String {
        self.raw.to_jwt()
    }

    /// The data covered by this token's signature.
    pub fn signed_data(&self) -> String {
        self.raw.signed_data()
    }

    /// Sign this token, committing its signature.
    pub async fn sign(self, signer: &impl Signer) -> Result<Self, SigningError> {
        if self.raw.signature.is_some() {
            return Err(SigningError::AlreadySigned);
        }
        if signer.did() != self.issuer() {
            return Err(SigningError::IssuerMismatch(signer.did().to_string()));
        }
        let algorithm = signer.algorithm().to_string();
        if algorithm != self.header.algorithm {
            return Err(SigningError::AlgorithmMismatch(algorithm));
        }
        let signature = signer.sign(self.signed_data().as_bytes()).await?;
        let Self { mut raw, header, payload } = self;
        raw.signature = Some(signature);
        Ok(Self { raw, header, payload })
    }

    /// Get the token header.
    pub fn header(&self) -> &UcanHeader {
        &self.header
    }

    /// Get the token payload.
    pub fn payload(&self) -> &UcanPayload {
        &self.payload
    }

    /// The signature algorithm.
    pub fn algorithm(&self) -> &str {
        &self.header.algorithm
    }

    /// The token type.
    pub fn typ(&self) -> &str {
        &self.header.typ
    }

    /// The format version, wherever it was declared.
    pub fn version(&self) -> &str {
        self.payload.version.as_deref().or(self.header.version.as_deref()).unwrap_or_default()
    }

    pub fn issuer(&self) -> &Did {
        &self.payload.issuer
    }

    pub fn audience(&self) -> &Did {
        &self.payload.audience
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.payload.expires_at
    }

    pub fn not_before(&self) -> Option<u64> {
        self.payload.not_before
    }

    pub fn nonce(&self) -> Option<&str> {
        self.payload.nonce.as_deref()
    }

    pub fn facts(&self) -> Option<&Value> {
        self.payload.facts.as_ref()
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        self.payload.capabilities()
    }

    pub fn proofs(&self) -> &[String] {
        self.payload.proofs()
    }

    /// The raw signature bytes, `None` for an unsigned token.
    pub fn signature(&self) -> Option<&[u8]> {
        self.raw.signature.as_deref()
    }

    /// Returns true if this token has expired at the given time.
    pub fn is_expired(&self, now: u64) -> bool {
        self.payload.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Returns true if this token is not yet valid at the given time.
    pub fn is_too_early(&self, now: u64) -> bool {
        self.payload.not_before.is_some_and(|not_before| now < not_before)
    }

    /// Returns true if this token's lifetime begins no later than the other's.
    pub fn lifetime_begins_before(&self, other: &Ucan) -> bool {
        match (self.payload.not_before, other.payload.not_before) {
            (Some(left), Some(right)) => left <= right,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// Returns true if this token's lifetime ends no earlier than the other's.
    pub fn lifetime_ends_after(&self, other: &Ucan) -> bool {
        match (self.payload.expires_at, other.payload.expires_at) {
            (Some(left), Some(right)) => left >= right,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    /// Returns true if this token's lifetime fully contains the other's.
    pub fn lifetime_encompasses(&self, other: &Ucan) -> bool {
        self.lifetime_begins_before(other) && self.lifetime_ends_after(other)
    }

    /// Compute the content identifier for this token using the given hash function.
    pub fn to_cid(&self, hasher: HashAlgorithm) -> Cid {
        hasher.cid(self.encode().as_bytes())
    }
}

impl FromStr for Ucan {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
