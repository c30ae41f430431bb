use crate::ports::PortRef;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Identifies a namespaced cluster object.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

/// The part a routing resource plays in host aggregation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Declares a virtual host without any paths.
    Master,

    /// Contributes paths to a master's virtual host.
    Minion,

    /// A standalone resource that is not aggregated.
    #[default]
    None,
}

/// A routing resource as observed by the controller.
///
/// Annotations that drive controller behavior are parsed once, when the resource is ingested, so
/// consumers never need to re-read the raw annotation map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoutingResource {
    pub id: ResourceId,

    /// The raw annotations, retained for the configuration generator.
    pub annotations: BTreeMap<String, String>,

    /// The ingress class this resource opts into, if any. An empty class is treated as unset.
    pub class: Option<String>,

    pub role: Role,

    /// The name of the secret holding the JSON Web Key used to validate request tokens.
    pub jwt_key: Option<String>,

    /// Whether active health checks should be derived from pod probes.
    pub health_checks: bool,

    pub default_backend: Option<Backend>,

    pub rules: Vec<HostRule>,

    pub tls: Vec<TlsBinding>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HostRule {
    pub host: String,

    /// `None` when the rule has no HTTP section at all, which is distinct from an HTTP section
    /// without paths.
    pub http: Option<HttpRule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HttpRule {
    pub paths: Vec<PathRule>,

    /// The number of declared paths that were dropped because their backend can't be expressed.
    /// They still count as declared paths, e.g. when validating a master.
    pub ignored_paths: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathRule {
    pub path: String,
    pub backend: Backend,
}

/// The service and port that traffic is forwarded to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Backend {
    pub service: String,
    pub port: PortRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TlsBinding {
    pub secret: String,
    pub hosts: Vec<String>,
}

// === impl ResourceId ===

impl ResourceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// === impl HttpRule ===

impl HttpRule {
    /// Whether any path was declared, including paths that were dropped.
    pub fn has_paths(&self) -> bool {
        !self.paths.is_empty() || self.ignored_paths > 0
    }
}

// === impl Role ===

impl Role {
    pub fn is_mergeable(&self) -> bool {
        matches!(self, Self::Master | Self::Minion)
    }
}

impl std::str::FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Self::Master),
            "minion" => Ok(Self::Minion),
            s => Err(InvalidRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => "master".fmt(f),
            Self::Minion => "minion".fmt(f),
            Self::None => "none".fmt(f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidRole(pub String);

impl fmt::Display for InvalidRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid mergeable ingress type: {:?}", self.0)
    }
}

impl std::error::Error for InvalidRole {}

// === impl RoutingResource ===

impl RoutingResource {
    /// Returns true if any host rule declares at least one path.
    pub fn has_paths(&self) -> bool {
        self.rules
            .iter()
            .any(|r| r.http.as_ref().is_some_and(HttpRule::has_paths))
    }

    /// Iterates over every backend referenced by this resource, including the default backend.
    pub fn backends(&self) -> impl Iterator<Item = &Backend> + '_ {
        self.default_backend.iter().chain(
            self.rules
                .iter()
                .flat_map(|r| r.http.iter())
                .flat_map(|h| h.paths.iter())
                .map(|p| &p.backend),
        )
    }

    pub fn references_service(&self, service: &str) -> bool {
        self.backends().any(|b| b.service == service)
    }

    /// Returns true if a TLS binding or the JWT key annotation names the given secret.
    ///
    /// Secrets are namespace-scoped, so callers must only pass secrets from this resource's
    /// namespace.
    pub fn references_secret(&self, secret: &str) -> bool {
        self.tls.iter().any(|t| t.secret == secret) || self.jwt_key.as_deref() == Some(secret)
    }

    /// The host of a resource that participates in aggregation, which must declare a single
    /// rule. Returns `None` when the rule structure is ambiguous.
    pub fn mergeable_host(&self) -> Option<&str> {
        match self.rules.as_slice() {
            [rule] => Some(rule.host.as_str()),
            _ => None,
        }
    }
}
