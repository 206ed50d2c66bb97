use crate::did::Did;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A JSON object.
pub type JsonObject = serde_json::Map<String, Value>;

/// Capabilities in the map layout: resource, then ability, then the caveats that apply to it.
pub type CapabilityMap = BTreeMap<String, BTreeMap<String, Vec<JsonObject>>>;

/// The token type every UCAN header carries.
pub const TOKEN_TYPE: &str = "JWT";

/// The format version written by this crate.
pub const UCAN_VERSION: &str = "0.10.0";

/// A UCAN header.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UcanHeader {
    /// The signature algorithm.
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// The token type.
    pub typ: String,

    /// The format version, only present in the older layout.
    #[serde(rename = "ucv", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Any other header fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A UCAN payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UcanPayload {
    /// The format version.
    #[serde(rename = "ucv", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The token issuer.
    #[serde(rename = "iss")]
    pub issuer: Did,

    /// The token audience.
    #[serde(rename = "aud")]
    pub audience: Did,

    /// The timestamp at which this token becomes invalid, `None` meaning it never expires.
    #[serde(rename = "exp", default)]
    pub expires_at: Option<u64>,

    /// The first timestamp at which this token is valid.
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<u64>,

    /// The token nonce.
    #[serde(rename = "nnc", default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Facts asserted by the issuer.
    #[serde(rename = "fct", default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<Value>,

    /// Capabilities in the map layout.
    #[serde(rename = "cap", default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilityMap>,

    /// Capabilities in the older list layout.
    #[serde(rename = "att", default, skip_serializing_if = "Option::is_none")]
    pub attenuations: Option<Vec<Attenuation>>,

    /// References to the proofs for this token.
    #[serde(rename = "prf", default, skip_serializing_if = "Option::is_none")]
    pub proofs: Option<Vec<String>>,

    /// Any other payload fields.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A capability in the older list layout.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Attenuation {
    /// The resource.
    pub with: String,

    /// The ability over the resource.
    pub can: String,

    /// Anything else attached to this capability.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// A single capability, regardless of the layout it was encoded in.
#[derive(Clone, Debug, PartialEq)]
pub struct Capability {
    /// The resource this capability applies to.
    pub resource: String,

    /// The ability granted over the resource.
    pub ability: String,

    /// Caveats restricting the ability.
    pub caveats: Vec<JsonObject>,
}

impl Capability {
    /// Construct a capability with no caveats.
    pub fn new<R: Into<String>, A: Into<String>>(resource: R, ability: A) -> Self {
        Self { resource: resource.into(), ability: ability.into(), caveats: Vec::new() }
    }

    /// Add a caveat to this capability.
    pub fn with_caveat(mut self, caveat: JsonObject) -> Self {
        self.caveats.push(caveat);
        self
    }
}

impl UcanPayload {
    /// All capabilities in this payload, in wire order.
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut output = Vec::new();
        if let Some(map) = &self.capabilities {
            for (resource, abilities) in map {
                for (ability, caveats) in abilities {
                    output.push(Capability {
                        resource: resource.clone(),
                        ability: ability.clone(),
                        caveats: caveats.clone(),
                    });
                }
            }
        }
        for attenuation in self.attenuations.iter().flatten() {
            let caveats = if attenuation.extra.is_empty() { Vec::new() } else { vec![attenuation.extra.clone()] };
            output.push(Capability { resource: attenuation.with.clone(), ability: attenuation.can.clone(), caveats });
        }
        output
    }

    /// The proof references in this payload.
    pub fn proofs(&self) -> &[String] {
        self.proofs.as_deref().unwrap_or_default()
    }
}

pub(crate) fn capability_map<I>(capabilities: I) -> CapabilityMap
where
    I: IntoIterator<Item = Capability>,
{
    let mut map = CapabilityMap::new();
    for Capability { resource, ability, caveats } in capabilities {
        map.entry(resource).or_default().entry(ability).or_default().extend(caveats);
    }
    map
}
