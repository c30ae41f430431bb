use ingress_controller_core::{
    Container, ContainerPortSpec, HttpGetProbe, Pod, PortRef, ProbeSpec, ResourceId, Service,
    ServicePortSpec,
};
use ingress_controller_k8s_api::{self as k8s, ResourceExt, Selector};
use std::net::IpAddr;

pub(crate) fn service(svc: k8s::Service) -> Service {
    let id = ResourceId::new(
        svc.namespace().expect("Service must have a namespace"),
        svc.name_unchecked(),
    );
    let spec = svc.spec.unwrap_or_default();
    let ports = spec
        .ports
        .into_iter()
        .flatten()
        .map(|p| ServicePortSpec {
            name: p.name.filter(|n| !n.is_empty()),
            port: u16::try_from(p.port).unwrap_or_else(|_| {
                tracing::info!(%id, port = p.port, "Ignoring invalid service port");
                0
            }),
            target_port: p.target_port.as_ref().and_then(port_ref),
            protocol: p.protocol,
        })
        .collect();
    let selector = spec
        .selector
        .map(Selector::from_map)
        .unwrap_or_default();

    Service {
        id,
        ports,
        selector,
    }
}

pub(crate) fn pod(pod: k8s::Pod) -> Pod {
    let id = ResourceId::new(
        pod.namespace().expect("Pod must have a namespace"),
        pod.name_unchecked(),
    );
    let labels = pod.metadata.labels.into();
    let status = pod.status.unwrap_or_default();
    let running = status.phase.as_deref() == Some("Running");
    let ip = status.pod_ip.as_deref().and_then(|ip| match ip.parse::<IpAddr>() {
        Ok(ip) => Some(ip),
        Err(error) => {
            tracing::info!(%id, %ip, %error, "Ignoring invalid pod IP");
            None
        }
    });
    let containers = pod
        .spec
        .map(|spec| spec.containers)
        .unwrap_or_default()
        .into_iter()
        .map(|c| container(&id, c))
        .collect();

    Pod {
        id,
        labels,
        ip,
        running,
        containers,
    }
}

fn container(id: &ResourceId, container: k8s::Container) -> Container {
    let ports = container
        .ports
        .into_iter()
        .flatten()
        .filter_map(|p| {
            let Ok(container_port) = u16::try_from(p.container_port) else {
                tracing::info!(%id, container = %container.name, port = p.container_port, "Ignoring invalid container port");
                return None;
            };
            Some(ContainerPortSpec {
                name: p.name.filter(|n| !n.is_empty()),
                container_port,
                protocol: p.protocol,
                host_ip: p.host_ip,
            })
        })
        .collect();
    let readiness_probe = container.readiness_probe.and_then(probe);

    Container {
        name: container.name,
        ports,
        readiness_probe,
    }
}

/// Only HTTP GET probes can drive upstream health checks; other probe kinds are ignored.
fn probe(probe: k8s::Probe) -> Option<ProbeSpec> {
    fn seconds(v: Option<i32>, default: u32) -> u32 {
        v.and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(default)
    }

    let http = probe.http_get?;
    let http_get = HttpGetProbe {
        path: http.path.filter(|p| !p.is_empty()).unwrap_or_else(|| "/".to_string()),
        host: http.host.filter(|h| !h.is_empty()),
        port: port_ref(&http.port)?,
        scheme: http.scheme.unwrap_or_else(|| "HTTP".to_string()),
        headers: http
            .http_headers
            .into_iter()
            .flatten()
            .map(|h| (h.name, h.value))
            .collect(),
    };

    Some(ProbeSpec {
        http_get,
        period_seconds: seconds(probe.period_seconds, ProbeSpec::DEFAULT_PERIOD_SECONDS),
        timeout_seconds: seconds(probe.timeout_seconds, ProbeSpec::DEFAULT_TIMEOUT_SECONDS),
        success_threshold: seconds(probe.success_threshold, ProbeSpec::DEFAULT_SUCCESS_THRESHOLD),
        failure_threshold: seconds(probe.failure_threshold, ProbeSpec::DEFAULT_FAILURE_THRESHOLD),
    })
}

/// Zero, negative, out-of-range and empty values are treated as unset.
fn port_ref(port: &k8s::IntOrString) -> Option<PortRef> {
    match port {
        k8s::IntOrString::Int(p) => u16::try_from(*p)
            .ok()
            .filter(|p| *p != 0)
            .map(PortRef::Number),
        k8s::IntOrString::String(n) if !n.is_empty() => Some(PortRef::Name(n.clone())),
        k8s::IntOrString::String(_) => None,
    }
}
