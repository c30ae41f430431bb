use ingress_controller_core::{
    Backend, HostRule, HttpRule, PathRule, PortRef, ResourceId, Role, RoutingResource, TlsBinding,
};
use ingress_controller_k8s_api::{self as k8s, ResourceExt};
use std::collections::BTreeMap;

pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
pub const MERGEABLE_TYPE_ANNOTATION: &str = "nginx.org/mergeable-ingress-type";
pub const JWT_KEY_ANNOTATION: &str = "nginx.com/jwt-key";
pub const HEALTH_CHECKS_ANNOTATION: &str = "nginx.com/health-checks";

/// Converts an `Ingress` into a routing resource, parsing the annotations that drive
/// controller behavior.
///
/// Backends that can't be expressed (e.g. resource backends or out-of-range port numbers) are
/// dropped; the rest of the resource is retained.
pub(crate) fn routing_resource(ingress: k8s::Ingress) -> RoutingResource {
    let namespace = ingress.namespace().expect("Ingress must have a namespace");
    let name = ingress.name_unchecked();
    let id = ResourceId::new(namespace, name);
    let annotations = ingress.metadata.annotations.unwrap_or_default();

    let class = annotations
        .get(INGRESS_CLASS_ANNOTATION)
        .filter(|c| !c.is_empty())
        .cloned();
    let role = parse_role(&id, &annotations);
    let jwt_key = annotations
        .get(JWT_KEY_ANNOTATION)
        .filter(|k| !k.is_empty())
        .cloned();
    let health_checks = annotations
        .get(HEALTH_CHECKS_ANNOTATION)
        .map(|v| parse_bool(&id, HEALTH_CHECKS_ANNOTATION, v))
        .unwrap_or(false);

    let spec = ingress.spec.unwrap_or_default();
    let default_backend = spec
        .default_backend
        .as_ref()
        .and_then(|b| backend(&id, b));
    let rules = spec
        .rules
        .into_iter()
        .flatten()
        .map(|rule| host_rule(&id, rule))
        .collect();
    let tls = spec
        .tls
        .into_iter()
        .flatten()
        .filter_map(|tls| {
            let secret = tls.secret_name.filter(|s| !s.is_empty())?;
            Some(TlsBinding {
                secret,
                hosts: tls.hosts.unwrap_or_default(),
            })
        })
        .collect();

    RoutingResource {
        id,
        annotations,
        class,
        role,
        jwt_key,
        health_checks,
        default_backend,
        rules,
        tls,
    }
}

fn parse_role(id: &ResourceId, annotations: &BTreeMap<String, String>) -> Role {
    match annotations.get(MERGEABLE_TYPE_ANNOTATION) {
        None => Role::None,
        Some(v) => v.parse().unwrap_or_else(|error| {
            tracing::info!(%id, %error, "Ignoring invalid mergeable ingress type");
            Role::None
        }),
    }
}

fn parse_bool(id: &ResourceId, annotation: &str, value: &str) -> bool {
    match value {
        "true" => true,
        "false" => false,
        _ => {
            tracing::info!(%id, %annotation, %value, "Ignoring invalid boolean annotation");
            false
        }
    }
}

fn host_rule(id: &ResourceId, rule: k8s::IngressRule) -> HostRule {
    let http = rule.http.map(|http| {
        let declared = http.paths.len();
        let paths = http
            .paths
            .into_iter()
            .filter_map(|p| {
                let backend = backend(id, &p.backend)?;
                // An unset path matches everything, like `/`, and collides with it when merged.
                Some(PathRule {
                    path: p.path.filter(|p| !p.is_empty()).unwrap_or_else(|| "/".to_string()),
                    backend,
                })
            })
            .collect::<Vec<_>>();
        HttpRule {
            ignored_paths: declared - paths.len(),
            paths,
        }
    });

    HostRule {
        host: rule.host.unwrap_or_default(),
        http,
    }
}

fn backend(id: &ResourceId, backend: &k8s::IngressBackend) -> Option<Backend> {
    let Some(svc) = backend.service.as_ref() else {
        tracing::debug!(%id, "Ignoring non-service backend");
        return None;
    };
    let port = match svc.port.as_ref() {
        Some(k8s::ServiceBackendPort {
            name: Some(name), ..
        }) if !name.is_empty() => PortRef::Name(name.clone()),
        Some(k8s::ServiceBackendPort {
            number: Some(number),
            ..
        }) => match u16::try_from(*number) {
            Ok(port) if port != 0 => PortRef::Number(port),
            _ => {
                tracing::info!(%id, service = %svc.name, port = %number, "Ignoring backend with invalid port");
                return None;
            }
        },
        _ => {
            tracing::info!(%id, service = %svc.name, "Ignoring backend without a port");
            return None;
        }
    };

    Some(Backend {
        service: svc.name.clone(),
        port,
    })
}
