use crate::ingress::MERGEABLE_TYPE_ANNOTATION;
use ingress_controller_core::{PortRef, ResourceId};
use serde::Serialize;

/// Prevents a routing resource's configuration from being generated.
///
/// Each error names the offending resource so that operators can fix it. Errors are contained to
/// the resource that caused them.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(
        "Ingress Resource {} with the '{}' annotation set to 'master' cannot contain Paths",
        .0,
        MERGEABLE_TYPE_ANNOTATION
    )]
    MasterWithPaths(ResourceId),

    #[error(
        "Ingress Resource {} with the '{}' annotation set to 'master' must contain exactly one host, found {}",
        .0,
        MERGEABLE_TYPE_ANNOTATION,
        .1
    )]
    MasterHostCount(ResourceId, usize),

    #[error("Could not find a Master for Minion: '{0}'")]
    NoMasterForMinion(ResourceId),
}

/// Prevents a single backend from being configured. The rest of the resource is unaffected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum BackendError {
    #[error("service {0} not found")]
    ServiceNotFound(ResourceId),

    #[error("service {service} has no port {port}")]
    PortNotFound { service: ResourceId, port: PortRef },
}

/// Prevents a TLS binding or JWT key from being configured.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum SecretError {
    #[error("secret {0} not found")]
    NotFound(ResourceId),

    #[error("secret {secret} must be of type {expected}, found {actual:?}")]
    InvalidType {
        secret: ResourceId,
        expected: &'static str,
        actual: Option<String>,
    },

    #[error("secret {secret} is missing key {key}")]
    MissingKey {
        secret: ResourceId,
        key: &'static str,
    },
}

impl Error {
    /// The resource that caused this error.
    pub fn resource(&self) -> &ResourceId {
        match self {
            Self::MasterWithPaths(id) | Self::MasterHostCount(id, _) | Self::NoMasterForMinion(id) => {
                id
            }
        }
    }
}
