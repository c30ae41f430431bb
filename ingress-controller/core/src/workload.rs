use crate::{
    ports::{ContainerPortSpec, ProbeSpec, ServicePortSpec},
    routing::ResourceId,
};
use ingress_controller_k8s_api::{Labels, Selector};
use std::net::IpAddr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    pub id: ResourceId,
    pub ports: Vec<ServicePortSpec>,

    /// Selects the pods backing this service. Empty for services whose endpoints are managed
    /// outside of the cluster.
    pub selector: Selector,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pod {
    pub id: ResourceId,
    pub labels: Labels,

    /// The pod's IP address, once one has been assigned.
    pub ip: Option<IpAddr>,

    /// Set when the pod is running and may receive traffic.
    pub running: bool,

    pub containers: Vec<Container>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub ports: Vec<ContainerPortSpec>,

    /// A readiness probe with an HTTP GET handler, if the container declares one.
    pub readiness_probe: Option<ProbeSpec>,
}

impl Service {
    pub fn selects(&self, labels: &Labels) -> bool {
        self.selector.matches(labels)
    }
}
