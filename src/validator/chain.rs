use crate::{
    content_id::HashAlgorithm,
    resolver::{ProofReference, ProofResolveError, ProofResolver},
    ucan::Ucan,
    verifier::{check_signature, KeyResolver},
};
use cid::Cid;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

use super::{error::ChainError, ValidationParameters};

// A pending link between a token and one of the proofs it references.
struct Link {
    child: Arc<Ucan>,
    reference: String,
    depth: usize,
}

/// Walk the delegation chain rooted at the given token.
///
/// The walk is depth first, following proofs in the order they are listed, and stops at the first
/// failure. Every link is validated. A token reachable through more than one path has its own
/// proofs expanded again only when it is reached at a greater depth than before, so the depth bound
/// always applies to the longest path.
pub(super) async fn validate_chain(
    ucan: &Ucan,
    proofs: &dyn ProofResolver,
    keys: &dyn KeyResolver,
    parameters: &ValidationParameters,
    now: u64,
) -> Result<(), ChainError> {
    let root = Arc::new(ucan.clone());
    // The deepest depth each token has had its proofs expanded at.
    let mut expanded: HashMap<Cid, usize> = HashMap::from([(root.to_cid(HashAlgorithm::default()), 0)]);
    let mut pending = Vec::new();
    push_links(&mut pending, root, 1);

    while let Some(Link { child, reference, depth }) = pending.pop() {
        if depth > parameters.max_chain_depth {
            return Err(ChainError::ChainTooDeep(parameters.max_chain_depth));
        }
        let parent = resolve(proofs, &reference).await?;
        validate_link(&parent, &child, &reference, keys, now).await?;

        let cid = parent.to_cid(HashAlgorithm::default());
        if expanded.get(&cid).is_some_and(|&previous| previous >= depth) {
            debug!("Proof {} already expanded", short_reference(&reference));
            continue;
        }
        expanded.insert(cid, depth);
        push_links(&mut pending, Arc::new(parent), depth + 1);
    }
    Ok(())
}

fn push_links(pending: &mut Vec<Link>, child: Arc<Ucan>, depth: usize) {
    // Pushed in reverse so the first listed proof is popped first.
    for reference in child.proofs().iter().rev() {
        pending.push(Link { child: child.clone(), reference: reference.clone(), depth });
    }
}

async fn resolve(proofs: &dyn ProofResolver, reference: &str) -> Result<Ucan, ChainError> {
    let parsed: ProofReference = reference.parse().map_err(|e| resolve_error(reference, e))?;
    let hasher = parsed.hasher().map_err(|e| resolve_error(reference, e))?;
    let parent = proofs.resolve(&parsed).await.map_err(|e| resolve_error(reference, e))?;
    if let (ProofReference::Cid(cid), Some(hasher)) = (&parsed, hasher) {
        if &parent.to_cid(hasher) != cid {
            return Err(ChainError::ProofMismatch(reference.to_string()));
        }
    }
    Ok(parent)
}

async fn validate_link(
    parent: &Ucan,
    child: &Ucan,
    reference: &str,
    keys: &dyn KeyResolver,
    now: u64,
) -> Result<(), ChainError> {
    let reference = short_reference(reference);
    if parent.audience() != child.issuer() {
        warn!("Proof {reference} is delegated to {} rather than {}", parent.audience(), child.issuer());
        return Err(ChainError::ProofChainBroken {
            reference,
            audience: parent.audience().to_string(),
            issuer: child.issuer().to_string(),
        });
    }
    if let Err(source) = check_signature(parent, keys).await {
        warn!("Proof {reference} has an invalid signature: {source}");
        return Err(ChainError::ProofSignature { reference, source });
    }
    if parent.is_expired(now) {
        return Err(ChainError::ProofExpired(reference));
    }
    if parent.is_too_early(now) {
        return Err(ChainError::ProofTooEarly(reference));
    }
    if !parent.lifetime_encompasses(child) {
        return Err(ChainError::LifetimeExceeded(reference));
    }
    Ok(())
}

fn resolve_error(reference: &str, error: ProofResolveError) -> ChainError {
    let reference = short_reference(reference);
    warn!("Cannot resolve proof {reference}: {error}");
    match error {
        ProofResolveError::NotFound(_) => ChainError::ProofNotFound(reference),
        ProofResolveError::InvalidReference(_) => ChainError::InvalidReference(reference),
        ProofResolveError::Malformed(source) => ChainError::MalformedProof { reference, source },
        ProofResolveError::Lookup(message) => ChainError::Resolver { reference, message },
    }
}

// Inlined proofs can be long, keep errors and logs readable.
fn short_reference(reference: &str) -> String {
    const MAX_LENGTH: usize = 64;
    match reference.char_indices().nth(MAX_LENGTH) {
        Some((index, _)) => format!("{}...", &reference[..index]),
        None => reference.to_string(),
    }
}
