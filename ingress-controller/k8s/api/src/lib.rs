#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod labels;

pub use self::labels::{Labels, Selector};
pub use k8s_openapi::{
    api::{
        self,
        core::v1::{
            Container, ContainerPort, HTTPGetAction, HTTPHeader, Pod, PodSpec, PodStatus, Probe,
            Secret, Service, ServicePort, ServiceSpec, TypedLocalObjectReference,
        },
        networking::v1::{
            HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
            IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
        },
    },
    apimachinery::pkg::util::intstr::IntOrString,
    ByteString,
};
pub use kube::{
    api::{ObjectMeta, ResourceExt},
    runtime::watcher,
    Client, Resource,
};
