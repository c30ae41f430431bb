mod dependents;

use crate::{
    ingress::{INGRESS_CLASS_ANNOTATION, JWT_KEY_ANNOTATION, MERGEABLE_TYPE_ANNOTATION},
    Admission, Index, SharedIndex,
};
use ingress_controller_core::{ResourceId, RoutingResource, SnapshotStore};
use ingress_controller_k8s_api::{self as k8s, ByteString};
use std::sync::Arc;

pub(crate) struct TestConfig {
    pub index: SharedIndex,
    pub admission: Admission,
    _tracing: tracing::subscriber::DefaultGuard,
}

impl TestConfig {
    pub fn new(admission: Admission) -> Self {
        Self {
            index: Index::shared(),
            admission,
            _tracing: init_tracing(),
        }
    }

    pub fn routing_resource(&self, ns: &str, name: &str) -> Arc<RoutingResource> {
        self.index
            .read()
            .routing_resource(&ResourceId::new(ns, name))
            .expect("resource must be indexed")
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new(Admission::new("nginx", false))
    }
}

pub(crate) fn init_tracing() -> tracing::subscriber::DefaultGuard {
    tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .finish(),
    )
}

/// Creates an ingress with a single rule for `host`. `paths` of `None` omits the rule's HTTP
/// section entirely.
pub(crate) fn mk_ingress(
    ns: impl ToString,
    name: impl ToString,
    host: impl ToString,
    paths: Option<Vec<k8s::HTTPIngressPath>>,
) -> k8s::Ingress {
    k8s::Ingress {
        metadata: k8s::ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(k8s::IngressSpec {
            rules: Some(vec![k8s::IngressRule {
                host: Some(host.to_string()),
                http: paths.map(|paths| k8s::HTTPIngressRuleValue { paths }),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn mk_path(
    path: impl ToString,
    service: impl ToString,
    port: i32,
) -> k8s::HTTPIngressPath {
    k8s::HTTPIngressPath {
        path: Some(path.to_string()),
        path_type: "Prefix".to_string(),
        backend: k8s::IngressBackend {
            service: Some(k8s::IngressServiceBackend {
                name: service.to_string(),
                port: Some(k8s::ServiceBackendPort {
                    number: Some(port),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
    }
}

/// Sets an ingress's annotations.
pub(crate) fn annotate(
    mut ingress: k8s::Ingress,
    annotations: impl IntoIterator<Item = (&'static str, &'static str)>,
) -> k8s::Ingress {
    ingress.metadata.annotations = Some(
        annotations
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    ingress
}

pub(crate) fn mk_master(ns: &str, name: &str, host: &str) -> k8s::Ingress {
    annotate(
        mk_ingress(ns, name, host, None),
        [(MERGEABLE_TYPE_ANNOTATION, "master")],
    )
}

/// Creates a minion whose paths are all served by `<name>-svc:80`.
pub(crate) fn mk_minion(ns: &str, name: &str, host: &str, paths: &[&str]) -> k8s::Ingress {
    let paths = paths
        .iter()
        .map(|p| mk_path(p, format!("{name}-svc"), 80))
        .collect();
    annotate(
        mk_ingress(ns, name, host, Some(paths)),
        [(MERGEABLE_TYPE_ANNOTATION, "minion")],
    )
}

pub(crate) fn with_annotation(
    mut ingress: k8s::Ingress,
    key: &str,
    value: &str,
) -> k8s::Ingress {
    ingress
        .metadata
        .annotations
        .get_or_insert_with(Default::default)
        .insert(key.to_string(), value.to_string());
    ingress
}

pub(crate) fn with_class(ingress: k8s::Ingress, class: &str) -> k8s::Ingress {
    with_annotation(ingress, INGRESS_CLASS_ANNOTATION, class)
}

pub(crate) fn with_jwt_key(ingress: k8s::Ingress, secret: &str) -> k8s::Ingress {
    with_annotation(ingress, JWT_KEY_ANNOTATION, secret)
}

pub(crate) fn with_tls(mut ingress: k8s::Ingress, secret: &str) -> k8s::Ingress {
    let spec = ingress.spec.get_or_insert_with(Default::default);
    let hosts = spec
        .rules
        .iter()
        .flatten()
        .filter_map(|r| r.host.clone())
        .collect();
    spec.tls.get_or_insert_with(Vec::new).push(k8s::IngressTLS {
        hosts: Some(hosts),
        secret_name: Some(secret.to_string()),
    });
    ingress
}

pub(crate) fn mk_service(
    ns: impl ToString,
    name: impl ToString,
    selector: impl IntoIterator<Item = (&'static str, &'static str)>,
    ports: Vec<k8s::ServicePort>,
) -> k8s::Service {
    k8s::Service {
        metadata: k8s::ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(k8s::ServiceSpec {
            selector: Some(
                selector
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ports: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn mk_service_port(
    name: Option<&str>,
    port: i32,
    target_port: Option<k8s::IntOrString>,
) -> k8s::ServicePort {
    k8s::ServicePort {
        name: name.map(Into::into),
        port,
        target_port,
        ..Default::default()
    }
}

pub(crate) fn mk_pod(
    ns: impl ToString,
    name: impl ToString,
    labels: impl IntoIterator<Item = (&'static str, &'static str)>,
    ip: &str,
    containers: Vec<k8s::Container>,
) -> k8s::Pod {
    k8s::Pod {
        metadata: k8s::ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            labels: Some(
                labels
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        spec: Some(k8s::PodSpec {
            containers,
            ..Default::default()
        }),
        status: Some(k8s::PodStatus {
            phase: Some("Running".to_string()),
            pod_ip: Some(ip.to_string()),
            ..Default::default()
        }),
    }
}

pub(crate) fn mk_container(name: impl ToString, ports: Vec<(&str, i32)>) -> k8s::Container {
    k8s::Container {
        name: name.to_string(),
        ports: Some(
            ports
                .into_iter()
                .map(|(name, port)| k8s::ContainerPort {
                    name: Some(name.to_string()),
                    container_port: port,
                    ..Default::default()
                })
                .collect(),
        ),
        ..Default::default()
    }
}

pub(crate) fn mk_http_probe(port: k8s::IntOrString, period_seconds: i32) -> k8s::Probe {
    k8s::Probe {
        http_get: Some(k8s::HTTPGetAction {
            path: Some("/healthz".to_string()),
            port,
            ..Default::default()
        }),
        period_seconds: Some(period_seconds),
        ..Default::default()
    }
}

pub(crate) fn mk_secret(
    ns: impl ToString,
    name: impl ToString,
    type_: &str,
    keys: &[&str],
) -> k8s::Secret {
    k8s::Secret {
        metadata: k8s::ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        },
        type_: Some(type_.to_string()),
        data: Some(
            keys.iter()
                .map(|k| (k.to_string(), ByteString(b"data".to_vec())))
                .collect(),
        ),
        ..Default::default()
    }
}
