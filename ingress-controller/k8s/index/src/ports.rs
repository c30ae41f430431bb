//! Resolves backend ports to service ports and service ports to pod containers.

use ingress_controller_core::{
    ContainerPortSpec, Pod, PortRef, ProbeSpec, Service, ServicePortSpec,
};
use std::{collections::BTreeSet, net::SocketAddr};

/// Finds the service port that a backend refers to, by number or by name.
pub fn resolve_service_port<'s>(
    port: &PortRef,
    service: &'s Service,
) -> Option<&'s ServicePortSpec> {
    service.ports.iter().find(|sp| match port {
        PortRef::Number(n) => sp.port == *n,
        PortRef::Name(n) => sp.name.as_deref() == Some(n.as_str()),
    })
}

/// Returns true if traffic sent to the service port lands on the container port.
///
/// A named target port must match the container port's name and protocol. A numeric target port
/// must match the container port number. Without a target port, the service port number itself
/// must match the container port. Zero ports never match.
pub fn compare_container_port_and_service_port(
    container_port: &ContainerPortSpec,
    service_port: &ServicePortSpec,
) -> bool {
    match &service_port.target_port {
        Some(PortRef::Name(name)) => {
            container_port.name.as_deref() == Some(name.as_str())
                && container_port.protocol == service_port.protocol
        }
        Some(PortRef::Number(port)) => *port != 0 && container_port.container_port == *port,
        None => service_port.port != 0 && container_port.container_port == service_port.port,
    }
}

/// Returns the readiness probe of the first container, across pods, that declares a port matching
/// the service port and an HTTP probe.
pub fn find_probe_for_pods<'p>(
    pods: impl IntoIterator<Item = &'p Pod>,
    service_port: &ServicePortSpec,
) -> Option<&'p ProbeSpec> {
    pods.into_iter()
        .flat_map(|pod| pod.containers.iter())
        .filter(|c| {
            c.ports
                .iter()
                .any(|cp| compare_container_port_and_service_port(cp, service_port))
        })
        .find_map(|c| c.readiness_probe.as_ref())
}

/// Lists the addresses of running pods' container ports that the service port targets.
pub fn endpoints_for_pods<'p>(
    pods: impl IntoIterator<Item = &'p Pod>,
    service_port: &ServicePortSpec,
) -> Vec<SocketAddr> {
    let endpoints = pods
        .into_iter()
        .filter(|pod| pod.running)
        .filter_map(|pod| Some((pod.ip?, pod)))
        .flat_map(|(ip, pod)| {
            pod.containers
                .iter()
                .flat_map(|c| c.ports.iter())
                .filter(|cp| compare_container_port_and_service_port(cp, service_port))
                .map(move |cp| SocketAddr::new(ip, cp.container_port))
        })
        .collect::<BTreeSet<_>>();
    endpoints.into_iter().collect()
}
