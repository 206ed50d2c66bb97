pub mod api;
pub mod builder;
pub mod canonical;
pub mod codec;
pub mod content_id;
pub mod did;
pub mod error;
pub mod keypair;
pub mod resolver;
pub mod signer;
pub mod token;
pub mod ucan;
pub mod validator;
pub mod verifier;

#[cfg(test)]
mod fixtures;

pub use builder::UcanBuilder;
pub use content_id::HashAlgorithm;
pub use did::Did;
pub use error::Error;
pub use keypair::Keypair;
pub use signer::Signer;
pub use ucan::Ucan;
pub use validator::{UcanValidator, ValidationParameters};
