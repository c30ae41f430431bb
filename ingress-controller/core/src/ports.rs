use serde::Serialize;
use std::fmt;

/// References a port either by number or by name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum PortRef {
    Number(u16),
    Name(String),
}

/// A port exposed by a service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortSpec {
    pub name: Option<String>,

    /// The port exposed by the service. Zero when unset.
    pub port: u16,

    /// The port on the backing pods; `None` when the service does not set one.
    pub target_port: Option<PortRef>,

    pub protocol: Option<String>,
}

/// A port declared by a container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPortSpec {
    pub name: Option<String>,

    /// Zero when unset.
    pub container_port: u16,

    pub protocol: Option<String>,

    /// Informational only; never used for matching.
    pub host_ip: Option<String>,
}

/// A container probe that can drive upstream health checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    pub http_get: HttpGetProbe,

    /// How often the probe runs.
    pub period_seconds: u32,

    pub timeout_seconds: u32,
    pub success_threshold: u32,
    pub failure_threshold: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetProbe {
    pub path: String,
    pub host: Option<String>,
    pub port: PortRef,
    pub scheme: String,
    pub headers: Vec<(String, String)>,
}

// === impl PortRef ===

impl From<u16> for PortRef {
    fn from(port: u16) -> Self {
        Self::Number(port)
    }
}

impl From<&str> for PortRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(port) => port.fmt(f),
            Self::Name(name) => name.fmt(f),
        }
    }
}

// === impl ProbeSpec ===

impl ProbeSpec {
    /// Kubernetes defaults, applied when a probe leaves a field unset.
    pub const DEFAULT_PERIOD_SECONDS: u32 = 10;
    pub const DEFAULT_TIMEOUT_SECONDS: u32 = 1;
    pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 1;
    pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
}
