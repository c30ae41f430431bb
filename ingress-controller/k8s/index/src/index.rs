//! Mirrors the cluster objects that routing depends on.
//!
//! The `Index` is updated by watch tasks through `kubert::index::IndexNamespacedResource` and read
//! by the reconciler through the `SnapshotStore` trait. Each mutation that changes what the
//! controller observes is published as a `Change` to the subscriber, if any.

use crate::{ingress, secrets, workload};
use ahash::AHashMap as HashMap;
use ingress_controller_core::{
    Change, Pod, ResourceId, Role, RoutingResource, Secret, Service, SnapshotStore,
};
use ingress_controller_k8s_api as k8s;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::instrument;

pub type SharedIndex = Arc<RwLock<Index>>;

#[derive(Debug, Default)]
pub struct Index {
    pub(crate) namespaces: HashMap<String, Namespace>,

    /// Orders routing resources by when they were first observed.
    next_seq: u64,

    changes: Option<mpsc::UnboundedSender<Change>>,
}

/// Holds the objects of a single namespace, by name.
#[derive(Debug, Default)]
pub(crate) struct Namespace {
    pub(crate) routing: HashMap<String, Indexed>,
    pub(crate) services: HashMap<String, Arc<Service>>,
    pub(crate) pods: HashMap<String, Arc<Pod>>,
    pub(crate) secrets: HashMap<String, Arc<Secret>>,
}

#[derive(Debug)]
pub(crate) struct Indexed {
    seq: u64,
    resource: Arc<RoutingResource>,
}

// === impl Index ===

impl Index {
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Subscribes to changes. Only the most recent subscriber receives updates.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Change> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.changes = Some(tx);
        rx
    }

    fn publish(&mut self, change: Change) {
        let Some(tx) = self.changes.as_ref() else {
            return;
        };
        if tx.send(change).is_err() {
            tracing::debug!("Change subscriber dropped");
            self.changes = None;
        }
    }

    fn ns_or_default(&mut self, ns: String) -> &mut Namespace {
        self.namespaces.entry(ns).or_default()
    }

    fn remove_empty(&mut self, ns: &str) {
        if self.namespaces.get(ns).is_some_and(Namespace::is_empty) {
            self.namespaces.remove(ns);
        }
    }

    #[instrument(skip_all, fields(ns = %rsrc.id.namespace, name = %rsrc.id.name))]
    fn apply_routing_resource(&mut self, rsrc: RoutingResource) {
        let id = rsrc.id.clone();
        let rsrc = Arc::new(rsrc);
        let next_seq = self.next_seq;
        let ns = self.ns_or_default(id.namespace.clone());

        let prior = match ns.routing.get_mut(&id.name) {
            Some(indexed) if *indexed.resource == *rsrc => {
                tracing::trace!("Unchanged");
                return;
            }
            Some(indexed) => {
                tracing::debug!("Updated");
                Some(std::mem::replace(&mut indexed.resource, rsrc.clone()))
            }
            None => {
                tracing::debug!("Added");
                ns.routing.insert(
                    id.name.clone(),
                    Indexed {
                        seq: next_seq,
                        resource: rsrc.clone(),
                    },
                );
                None
            }
        };
        if prior.is_none() {
            self.next_seq += 1;
        }

        let versions = || prior.iter().chain(Some(&rsrc));
        self.publish(Change::RoutingResource {
            id,
            minion_hosts: mergeable_hosts(Role::Minion, versions()),
            master_hosts: mergeable_hosts(Role::Master, versions()),
        });
    }

    #[instrument(skip(self))]
    fn delete_routing_resource(&mut self, ns: String, name: String) {
        let Some(indexed) = self
            .namespaces
            .get_mut(&ns)
            .and_then(|n| n.routing.remove(&name))
        else {
            return;
        };
        tracing::debug!("Deleted");
        self.remove_empty(&ns);

        self.publish(Change::RoutingResource {
            id: ResourceId::new(ns, name),
            minion_hosts: mergeable_hosts(Role::Minion, Some(&indexed.resource)),
            master_hosts: mergeable_hosts(Role::Master, Some(&indexed.resource)),
        });
    }
}

/// Collects the hosts that versions of a resource with the given role attach to.
fn mergeable_hosts<'a>(
    role: Role,
    rsrcs: impl IntoIterator<Item = &'a Arc<RoutingResource>>,
) -> Vec<String> {
    let mut hosts = rsrcs
        .into_iter()
        .filter(|r| r.role == role)
        .filter_map(|r| r.rules.first().map(|rule| rule.host.clone()))
        .collect::<Vec<_>>();
    hosts.sort();
    hosts.dedup();
    hosts
}

impl kubert::index::IndexNamespacedResource<k8s::Ingress> for Index {
    fn apply(&mut self, ingress: k8s::Ingress) {
        self.apply_routing_resource(ingress::routing_resource(ingress));
    }

    fn delete(&mut self, ns: String, name: String) {
        self.delete_routing_resource(ns, name);
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Service> for Index {
    #[instrument(skip_all)]
    fn apply(&mut self, svc: k8s::Service) {
        let svc = workload::service(svc);
        let id = svc.id.clone();
        let services = &mut self.ns_or_default(id.namespace.clone()).services;
        if services.get(&id.name).is_some_and(|s| **s == svc) {
            return;
        }
        tracing::debug!(%id, "Indexed service");
        services.insert(id.name.clone(), Arc::new(svc));
        self.publish(Change::Service(id));
    }

    #[instrument(skip(self))]
    fn delete(&mut self, ns: String, name: String) {
        if self
            .namespaces
            .get_mut(&ns)
            .and_then(|n| n.services.remove(&name))
            .is_none()
        {
            return;
        }
        tracing::debug!("Deleted service");
        self.remove_empty(&ns);
        self.publish(Change::Service(ResourceId::new(ns, name)));
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Pod> for Index {
    #[instrument(skip_all)]
    fn apply(&mut self, pod: k8s::Pod) {
        let pod = workload::pod(pod);
        let id = pod.id.clone();
        let pods = &mut self.ns_or_default(id.namespace.clone()).pods;
        let mut labels = match pods.get(&id.name) {
            Some(prior) if **prior == pod => return,
            Some(prior) => vec![prior.labels.clone()],
            None => vec![],
        };
        if labels.first() != Some(&pod.labels) {
            labels.push(pod.labels.clone());
        }
        tracing::trace!(%id, "Indexed pod");
        pods.insert(id.name.clone(), Arc::new(pod));
        self.publish(Change::Pod { id, labels });
    }

    #[instrument(skip(self))]
    fn delete(&mut self, ns: String, name: String) {
        let Some(pod) = self
            .namespaces
            .get_mut(&ns)
            .and_then(|n| n.pods.remove(&name))
        else {
            return;
        };
        tracing::trace!("Deleted pod");
        self.remove_empty(&ns);
        self.publish(Change::Pod {
            id: ResourceId::new(ns, name),
            labels: vec![pod.labels.clone()],
        });
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Secret> for Index {
    /// Secret contents aren't indexed, so every update is published: a rotated certificate must
    /// reach the configuration even when the secret's keys are unchanged.
    #[instrument(skip_all)]
    fn apply(&mut self, secret: k8s::Secret) {
        let secret = secrets::secret(secret);
        let id = secret.id.clone();
        tracing::debug!(%id, "Indexed secret");
        self.ns_or_default(id.namespace.clone())
            .secrets
            .insert(id.name.clone(), Arc::new(secret));
        self.publish(Change::Secret(id));
    }

    #[instrument(skip(self))]
    fn delete(&mut self, ns: String, name: String) {
        if self
            .namespaces
            .get_mut(&ns)
            .and_then(|n| n.secrets.remove(&name))
            .is_none()
        {
            return;
        }
        tracing::debug!("Deleted secret");
        self.remove_empty(&ns);
        self.publish(Change::Secret(ResourceId::new(ns, name)));
    }
}

impl SnapshotStore for Index {
    fn routing_resource(&self, id: &ResourceId) -> Option<Arc<RoutingResource>> {
        let indexed = self.namespaces.get(&id.namespace)?.routing.get(&id.name)?;
        Some(indexed.resource.clone())
    }

    fn routing_resources_in(&self, namespace: &str) -> Vec<Arc<RoutingResource>> {
        in_discovery_order(
            self.namespaces
                .get(namespace)
                .into_iter()
                .flat_map(|ns| ns.routing.values()),
        )
    }

    fn routing_resources(&self) -> Vec<Arc<RoutingResource>> {
        in_discovery_order(self.namespaces.values().flat_map(|ns| ns.routing.values()))
    }

    fn service(&self, namespace: &str, name: &str) -> Option<Arc<Service>> {
        self.namespaces.get(namespace)?.services.get(name).cloned()
    }

    fn services_in(&self, namespace: &str) -> Vec<Arc<Service>> {
        let mut services = self
            .namespaces
            .get(namespace)
            .into_iter()
            .flat_map(|ns| ns.services.values().cloned())
            .collect::<Vec<_>>();
        services.sort_by(|a, b| a.id.cmp(&b.id));
        services
    }

    fn pods_for_service(&self, service: &Service) -> Vec<Arc<Pod>> {
        let mut pods = self
            .namespaces
            .get(&service.id.namespace)
            .into_iter()
            .flat_map(|ns| ns.pods.values())
            .filter(|pod| service.selects(&pod.labels))
            .cloned()
            .collect::<Vec<_>>();
        pods.sort_by(|a, b| a.id.cmp(&b.id));
        pods
    }

    fn secret(&self, namespace: &str, name: &str) -> Option<Arc<Secret>> {
        self.namespaces.get(namespace)?.secrets.get(name).cloned()
    }
}

fn in_discovery_order<'a>(
    indexed: impl IntoIterator<Item = &'a Indexed>,
) -> Vec<Arc<RoutingResource>> {
    let mut indexed = indexed.into_iter().collect::<Vec<_>>();
    indexed.sort_by_key(|i| i.seq);
    indexed.into_iter().map(|i| i.resource.clone()).collect()
}

// === impl Namespace ===

impl Namespace {
    fn is_empty(&self) -> bool {
        self.routing.is_empty()
            && self.services.is_empty()
            && self.pods.is_empty()
            && self.secrets.is_empty()
    }
}
