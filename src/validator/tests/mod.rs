
use self::fixtures::*;
use crate::{
    did::{Did, PublicKey},
    fixtures::{alice, bob, ALG_MISMATCH_TOKEN, INVALID_SIGNATURE_TOKEN, UNSUPPORTED_ALG_TOKEN, VALID_TOKEN},
    keypair::Keypair,
    signer::{Signer, SigningError},
    ucan::Ucan,
    validator::{error::ValidationKind, ValidationError},
    verifier::{JwtAlgorithm, KeyResolver, SignatureError},
};
use async_trait::async_trait;
use rstest::rstest;
use std::collections::HashMap;

const WEB_DID: &str = "did:web:example.com";

// Resolves a fixed set of Dids to keys.
struct StaticKeyResolver(HashMap<Did, PublicKey>);

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve_key(&self, did: &Did) -> Result<PublicKey, SignatureError> {
        self.0.get(did).cloned().ok_or_else(|| SignatureError::UnresolvableIssuer(did.to_string()))
    }
}

// Signs on behalf of a Did whose key isn't embedded in it.
struct WebSigner {
    did: Did,
    keypair: Keypair,
}

#[async_trait]
impl Signer for WebSigner {
    fn did(&self) -> &Did {
        &self.did
    }

    fn algorithm(&self) -> JwtAlgorithm {
        self.keypair.algorithm()
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.keypair.signer().sign(message).await
    }
}

#[tokio::test]
async fn valid_token() {
    let ucan = Ucan::decode(VALID_TOKEN).unwrap();
    Asserter::default().assert_success(&ucan).await;
}

#[rstest]
#[case::invalid_signature(INVALID_SIGNATURE_TOKEN)]
#[case::algorithm_mismatch(ALG_MISMATCH_TOKEN)]
#[case::unsupported_algorithm(UNSUPPORTED_ALG_TOKEN)]
#[tokio::test]
async fn bad_signature(#[case] token: &str) {
    let ucan = Ucan::decode(token).unwrap();
    Asserter::default().assert_failure(&ucan, ValidationKind::Signature).await;
}

#[tokio::test]
async fn unsigned_token() {
    let ucan = delegation(&alice(), &bob()).build().expect("build failed");
    let err = Asserter::default().assert_failure(&ucan, ValidationKind::Signature).await;
    assert!(matches!(err, ValidationError::Signature(SignatureError::MissingSignature)), "{err}");
}

#[tokio::test]
async fn signature_checked_before_time() {
    let ucan = delegation(&alice(), &bob()).with_expiration(5).build().expect("build failed");
    Asserter::default().at_timestamp(10).assert_failure(&ucan, ValidationKind::Signature).await;
}

#[tokio::test]
async fn custom_key_resolver() {
    let did: Did = WEB_DID.parse().unwrap();
    let signer = WebSigner { did: did.clone(), keypair: alice() };
    let ucan = delegation(&alice(), &bob()).issued_by(&signer).sign(&signer).await.expect("signing failed");

    let err = Asserter::default().assert_failure(&ucan, ValidationKind::Signature).await;
    assert!(matches!(err, ValidationError::Signature(SignatureError::UnresolvableIssuer(_))), "{err}");

    let resolver = StaticKeyResolver(HashMap::from([(did, alice().public_key().clone())]));
    let validator = crate::validator::UcanValidator::default().with_key_resolver(resolver);
    validator.check_signature(&ucan).await.expect("invalid signature");
}
