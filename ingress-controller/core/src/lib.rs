#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod merged;
pub mod ports;
pub mod routing;
pub mod secret;
pub mod store;
pub mod workload;

pub use self::{
    merged::{MergedRoutingSet, Minion},
    ports::{ContainerPortSpec, HttpGetProbe, PortRef, ProbeSpec, ServicePortSpec},
    routing::{
        Backend, HostRule, HttpRule, PathRule, ResourceId, Role, RoutingResource, TlsBinding,
    },
    secret::Secret,
    store::{Change, SnapshotStore},
    workload::{Container, Pod, Service},
};

pub const INGRESS_CONTROLLER_NAME: &str = "nginx.org/ingress-controller";
