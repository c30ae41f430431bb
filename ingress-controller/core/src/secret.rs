use crate::routing::ResourceId;
use std::collections::BTreeSet;

/// The parts of a secret the controller inspects. Secret data itself is never indexed; only the
/// names of its keys are retained so that bindings can be validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secret {
    pub id: ResourceId,

    /// The secret's `type`, e.g. `kubernetes.io/tls`.
    pub type_: Option<String>,

    pub keys: BTreeSet<String>,
}

impl Secret {
    pub const TLS_TYPE: &'static str = "kubernetes.io/tls";
    pub const TLS_CERT_KEY: &'static str = "tls.crt";
    pub const TLS_PRIVATE_KEY_KEY: &'static str = "tls.key";

    pub const JWK_TYPE: &'static str = "nginx.org/jwk";
    pub const JWK_KEY: &'static str = "jwk";

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}
