use crate::{
    routing::{ResourceId, RoutingResource},
    secret::Secret,
    workload::{Pod, Service},
};
use ingress_controller_k8s_api::Labels;
use std::sync::Arc;

/// Read access to a local, eventually-consistent mirror of cluster state.
///
/// Every lookup is a pure read against local state: absent objects yield `None` or an empty
/// list. Callers that need a consistent view across several lookups must hold the store for the
/// duration of their computation, so implementations never change underneath a `&self` borrow.
pub trait SnapshotStore {
    fn routing_resource(&self, id: &ResourceId) -> Option<Arc<RoutingResource>>;

    /// Lists the routing resources in a namespace in discovery order, i.e. the order in which
    /// the store first observed them.
    fn routing_resources_in(&self, namespace: &str) -> Vec<Arc<RoutingResource>>;

    /// Lists all routing resources in discovery order.
    fn routing_resources(&self) -> Vec<Arc<RoutingResource>>;

    fn service(&self, namespace: &str, name: &str) -> Option<Arc<Service>>;

    fn services_in(&self, namespace: &str) -> Vec<Arc<Service>>;

    /// Lists the pods in the service's namespace that its selector matches.
    fn pods_for_service(&self, service: &Service) -> Vec<Arc<Pod>>;

    fn secret(&self, namespace: &str, name: &str) -> Option<Arc<Secret>>;
}

/// Describes an observed change to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    RoutingResource {
        id: ResourceId,

        /// The hosts the resource contributed to, as a minion, before or after the change.
        minion_hosts: Vec<String>,

        /// The hosts the resource declared, as a master, before or after the change.
        master_hosts: Vec<String>,
    },

    Service(ResourceId),

    Pod {
        id: ResourceId,

        /// The pod's labels before and after the change, so that services that selected the
        /// pod before a relabeling are notified too.
        labels: Vec<Labels>,
    },

    Secret(ResourceId),
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn routing_resource(&self, id: &ResourceId) -> Option<Arc<RoutingResource>> {
        (**self).routing_resource(id)
    }

    fn routing_resources_in(&self, namespace: &str) -> Vec<Arc<RoutingResource>> {
        (**self).routing_resources_in(namespace)
    }

    fn routing_resources(&self) -> Vec<Arc<RoutingResource>> {
        (**self).routing_resources()
    }

    fn service(&self, namespace: &str, name: &str) -> Option<Arc<Service>> {
        (**self).service(namespace, name)
    }

    fn services_in(&self, namespace: &str) -> Vec<Arc<Service>> {
        (**self).services_in(namespace)
    }

    fn pods_for_service(&self, service: &Service) -> Vec<Arc<Pod>> {
        (**self).pods_for_service(service)
    }

    fn secret(&self, namespace: &str, name: &str) -> Option<Arc<Secret>> {
        (**self).secret(namespace, name)
    }
}
