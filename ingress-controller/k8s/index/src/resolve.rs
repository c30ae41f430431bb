//! Resolves a routing resource into the model consumed by the configuration generator.

use crate::{
    admission::Admission,
    error::{BackendError, Error, SecretError},
    merge, ports, secrets,
};
use ingress_controller_core::{
    Backend, MergedRoutingSet, ProbeSpec, ResourceId, Role, RoutingResource, ServicePortSpec,
    SnapshotStore, TlsBinding,
};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};

/// The resolved configuration for a configuration key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Resolution {
    Single(ResolvedIngress),
    Merged(ResolvedMergeable),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIngress {
    pub resource: Arc<RoutingResource>,

    /// Every backend the resource references, in declaration order and without duplicates.
    pub backends: Vec<(Backend, Result<ResolvedBackend, BackendError>)>,

    pub tls: Vec<(TlsBinding, Result<(), SecretError>)>,
    pub jwt_key: Option<Result<(), SecretError>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBackend {
    pub service_port: ServicePortSpec,
    pub endpoints: Vec<SocketAddr>,

    /// Only looked up when the resource enables health checks.
    pub probe: Option<ProbeSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMergeable {
    pub merged: MergedRoutingSet,
    pub master: ResolvedIngress,

    /// Resolved in the same order as `merged.minions`.
    pub minions: Vec<ResolvedIngress>,
}

// === impl Resolution ===

impl Resolution {
    /// The configuration key: the resource itself or, for merged hosts, the master.
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Single(ing) => &ing.resource.id,
            Self::Merged(m) => &m.merged.master.id,
        }
    }
}

/// Resolves the configuration that the resource contributes to.
///
/// Minions resolve to their master's merged host. Returns `None` when the resource is unknown or
/// not owned. Errors are scoped to the returned resource: the caller rejects it and moves on.
pub fn resolve<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    id: &ResourceId,
) -> Result<Option<Resolution>, Error> {
    let Some(rsrc) = store.routing_resource(id) else {
        return Ok(None);
    };
    if !admission.owns(&rsrc) {
        tracing::debug!(%id, "Ignoring resource of another class");
        return Ok(None);
    }

    let master = match rsrc.role {
        Role::None => {
            return Ok(Some(Resolution::Single(resolve_ingress(
                store,
                rsrc.clone(),
                rsrc.backends(),
            ))))
        }
        Role::Master => rsrc,
        Role::Minion => merge::find_master_for_minion(store, admission, &rsrc)?,
    };
    let merged = merge::merged_routing_set(store, admission, master)?;

    let master = resolve_ingress(store, merged.master.clone(), merged.master.backends());
    let minions = merged
        .minions
        .iter()
        .map(|m| {
            resolve_ingress(
                store,
                m.resource.clone(),
                m.paths.iter().map(|p| &p.backend),
            )
        })
        .collect();
    Ok(Some(Resolution::Merged(ResolvedMergeable {
        merged,
        master,
        minions,
    })))
}

fn resolve_ingress<'b, S: SnapshotStore>(
    store: &S,
    resource: Arc<RoutingResource>,
    backends: impl IntoIterator<Item = &'b Backend>,
) -> ResolvedIngress {
    let ns = resource.id.namespace.as_str();

    let mut resolved = Vec::<(Backend, _)>::new();
    for backend in backends {
        if resolved.iter().any(|(b, _)| b == backend) {
            continue;
        }
        let result = resolve_backend(store, ns, backend, resource.health_checks);
        if let Err(error) = &result {
            tracing::info!(id = %resource.id, %error, "Unresolved backend");
        }
        resolved.push((backend.clone(), result));
    }

    let tls = resource
        .tls
        .iter()
        .map(|t| (t.clone(), secrets::validate_tls_secret(store, ns, &t.secret)))
        .collect();
    let jwt_key = resource
        .jwt_key
        .as_deref()
        .map(|k| secrets::validate_jwk_secret(store, ns, k));

    ResolvedIngress {
        backends: resolved,
        tls,
        jwt_key,
        resource,
    }
}

fn resolve_backend<S: SnapshotStore>(
    store: &S,
    ns: &str,
    backend: &Backend,
    health_checks: bool,
) -> Result<ResolvedBackend, BackendError> {
    let service = store
        .service(ns, &backend.service)
        .ok_or_else(|| BackendError::ServiceNotFound(ResourceId::new(ns, &backend.service)))?;
    let service_port = ports::resolve_service_port(&backend.port, &service)
        .ok_or_else(|| BackendError::PortNotFound {
            service: service.id.clone(),
            port: backend.port.clone(),
        })?
        .clone();

    let pods = store.pods_for_service(&service);
    let endpoints = ports::endpoints_for_pods(pods.iter().map(|p| &**p), &service_port);
    let probe = if health_checks {
        ports::find_probe_for_pods(pods.iter().map(|p| &**p), &service_port).cloned()
    } else {
        None
    };

    Ok(ResolvedBackend {
        service_port,
        endpoints,
        probe,
    })
}
