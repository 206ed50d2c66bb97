use crate::{
    token::{UcanHeader, UcanPayload, TOKEN_TYPE},
    ucan::Ucan,
};
use base64::{display::Base64Display, prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use tracing::debug;

const DEFAULT_MAX_RAW_TOKEN_SIZE: usize = 1024 * 64;
const SEGMENT_DELIMITER: char = '.';

/// A raw UCAN token.
///
/// This contains the raw parts that were decoded from the wire and is used to have access to the
/// unmodified bytes, which are what get signed and hashed.
#[derive(Clone, Debug, PartialEq)]
pub struct RawUcan {
    pub(crate) header: Vec<u8>,
    pub(crate) payload: Vec<u8>,
    pub(crate) signature: Option<Vec<u8>>,
}

impl RawUcan {
    fn from_jwt(s: &str) -> Result<Self, DecodeError> {
        let segments: Vec<&str> = s.split(SEGMENT_DELIMITER).collect();
        let [header, payload, signature] = segments.as_slice() else {
            return Err(DecodeError::MalformedFraming(FramingError::SegmentCount(segments.len())));
        };
        if header.is_empty() {
            return Err(DecodeError::MalformedFraming(FramingError::EmptySegment("header")));
        }
        if payload.is_empty() {
            return Err(DecodeError::MalformedFraming(FramingError::EmptySegment("payload")));
        }
        let header = from_base64(header).map_err(|e| DecodeError::MalformedEncoding("header", e))?;
        let payload = from_base64(payload).map_err(|e| DecodeError::MalformedEncoding("payload", e))?;
        let signature = match *signature {
            "" => None,
            signature => Some(from_base64(signature).map_err(|e| DecodeError::MalformedEncoding("signature", e))?),
        };
        Ok(Self { header, payload, signature })
    }

    /// The `header.payload` pair, as it appears on the wire.
    pub(crate) fn signed_data(&self) -> String {
        let header = Base64Display::new(&self.header, &BASE64_URL_SAFE_NO_PAD);
        let payload = Base64Display::new(&self.payload, &BASE64_URL_SAFE_NO_PAD);
        format!("{header}{SEGMENT_DELIMITER}{payload}")
    }

    pub(crate) fn to_jwt(&self) -> String {
        let signed_data = self.signed_data();
        match &self.signature {
            Some(signature) => {
                let signature = Base64Display::new(signature, &BASE64_URL_SAFE_NO_PAD);
                format!("{signed_data}{SEGMENT_DELIMITER}{signature}")
            }
            None => format!("{signed_data}{SEGMENT_DELIMITER}"),
        }
    }
}

/// A UCAN decoder.
#[derive(Debug)]
pub struct UcanDecoder {
    /// The maximum raw token size, in bytes.
    pub max_raw_token_size: usize,
}

impl Default for UcanDecoder {
    fn default() -> Self {
        Self { max_raw_token_size: DEFAULT_MAX_RAW_TOKEN_SIZE }
    }
}

impl UcanDecoder {
    /// Decode a UCAN.
    ///
    /// This performs no integrity checks, and instead only ensures the token is well formed.
    pub fn decode(&self, s: &str) -> Result<Ucan, DecodeError> {
        if s.len() > self.max_raw_token_size {
            return Err(DecodeError::TooLarge(self.max_raw_token_size));
        }
        let raw = RawUcan::from_jwt(s)?;
        let header: UcanHeader =
            serde_json::from_slice(&raw.header).map_err(|e| DecodeError::MalformedStructure("header", e))?;
        let payload: UcanPayload =
            serde_json::from_slice(&raw.payload).map_err(|e| DecodeError::MalformedStructure("payload", e))?;
        if header.typ != TOKEN_TYPE {
            return Err(DecodeError::InvalidTokenType(header.typ));
        }
        if header.version.is_none() && payload.version.is_none() {
            return Err(DecodeError::MissingVersion);
        }
        if payload.capabilities.is_none() && payload.attenuations.is_none() {
            return Err(DecodeError::MissingCapabilities);
        }
        debug!("Decoded token issued by {} for {}", payload.issuer, payload.audience);
        Ok(Ucan::from_raw_parts(raw, header, payload))
    }
}

/// An error when decoding a UCAN.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("token is larger than max allowed: {0} bytes")]
    TooLarge(usize),

    #[error("malformed token framing: {0}")]
    MalformedFraming(FramingError),

    #[error("invalid base64 found on {0}: {1}")]
    MalformedEncoding(&'static str, base64::DecodeError),

    #[error("invalid JSON on {0}: {1}")]
    MalformedStructure(&'static str, serde_json::Error),

    #[error("invalid token type: expected '{TOKEN_TYPE}', got '{0}'")]
    InvalidTokenType(String),

    #[error("no format version in header or payload")]
    MissingVersion,

    #[error("no capabilities in payload")]
    MissingCapabilities,
}

/// The way a token's segments are malformed.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum FramingError {
    #[error("expected 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("{0} segment is empty")]
    EmptySegment(&'static str),
}

pub(crate) fn from_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_URL_SAFE_NO_PAD.decode(input)
}

pub(crate) fn to_base64<T: AsRef<[u8]>>(input: T) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input)
}
