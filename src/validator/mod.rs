mod chain;
pub mod error;
mod temporal;

#[cfg(test)]
mod tests;

use crate::{
    resolver::ProofResolver,
    ucan::Ucan,
    verifier::{self, DidKeyResolver, KeyResolver},
};
use chrono::{DateTime, Utc};
use tracing::debug;

pub use error::{ChainError, ValidationError, ValidationKind};

const MAX_CHAIN_DEPTH: usize = 8;

/// The result of validating a UCAN token.
pub type ValidationResult = Result<(), ValidationError>;

/// Parameters to be used during validation.
#[derive(Clone, Debug)]
pub struct ValidationParameters {
    /// The maximum number of delegation links between a token and any of its root proofs.
    pub max_chain_depth: usize,
}

impl Default for ValidationParameters {
    fn default() -> Self {
        Self { max_chain_depth: MAX_CHAIN_DEPTH }
    }
}

/// A UCAN validator.
pub struct UcanValidator {
    time_provider: Box<dyn TimeProvider>,
    key_resolver: Box<dyn KeyResolver>,
    parameters: ValidationParameters,
}

impl Default for UcanValidator {
    fn default() -> Self {
        Self::new(ValidationParameters::default())
    }
}

impl UcanValidator {
    /// Construct a new validator that reads the system clock and resolves `did:key` issuers.
    pub fn new(parameters: ValidationParameters) -> Self {
        Self { time_provider: Box::new(SystemClockTimeProvider), key_resolver: Box::new(DidKeyResolver), parameters }
    }

    /// Use the given time source.
    pub fn with_time_provider<T: TimeProvider>(mut self, time_provider: T) -> Self {
        self.time_provider = Box::new(time_provider);
        self
    }

    /// Use the given key resolver for issuers.
    pub fn with_key_resolver<K: KeyResolver + 'static>(mut self, key_resolver: K) -> Self {
        self.key_resolver = Box::new(key_resolver);
        self
    }

    /// The current time, in seconds since the unix epoch.
    pub fn now(&self) -> u64 {
        u64::try_from(self.time_provider.current_time().timestamp()).unwrap_or_default()
    }

    /// Check the signature of a token.
    pub async fn check_signature(&self, ucan: &Ucan) -> ValidationResult {
        verifier::check_signature(ucan, self.key_resolver.as_ref()).await?;
        Ok(())
    }

    /// Validate a token: its signature, its time bounds and its whole proof chain.
    pub async fn validate(&self, ucan: &Ucan, proofs: &dyn ProofResolver) -> ValidationResult {
        let now = self.now();
        debug!("Validating token issued by {} at {now}", ucan.issuer());
        self.check_signature(ucan).await?;
        temporal::validate_temporal_properties(ucan, now)?;
        chain::validate_chain(ucan, proofs, self.key_resolver.as_ref(), &self.parameters, now).await?;
        Ok(())
    }
}

/// A source for the current time.
pub trait TimeProvider: Send + Sync + 'static {
    fn current_time(&self) -> DateTime<Utc>;
}

/// A time provider that reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClockTimeProvider;

impl TimeProvider for SystemClockTimeProvider {
    fn current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
