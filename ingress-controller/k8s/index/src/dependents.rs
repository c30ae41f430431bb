use crate::{admission::Admission, merge, secrets};
use ingress_controller_core::{Change, ResourceId, SnapshotStore};
use std::collections::BTreeSet;

/// Maps a change to the routing resources that must be reconciled.
///
/// A changed resource is always returned itself, so that a deleted or disowned resource has its
/// configuration removed. Resources that only matter through a master also return that master.
pub fn affected_resources<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    change: &Change,
) -> BTreeSet<ResourceId> {
    match change {
        Change::RoutingResource {
            id,
            minion_hosts,
            master_hosts,
        } => {
            let mut affected = BTreeSet::from([id.clone()]);
            affected.extend(
                minion_hosts
                    .iter()
                    .filter_map(|host| merge::find_master_for_host(store, admission, host))
                    .map(|m| m.id.clone()),
            );

            // A host that gains or loses a master resyncs its minions, and whichever master
            // now serves it.
            for host in master_hosts {
                affected.extend(
                    merge::minions_for_master(store, admission, host)
                        .into_iter()
                        .map(|m| m.id.clone()),
                );
                affected.extend(
                    merge::find_master_for_host(store, admission, host).map(|m| m.id.clone()),
                );
            }
            affected
        }

        Change::Service(id) => referencing_service(store, admission, &id.namespace, &id.name),

        Change::Pod { id, labels } => store
            .services_in(&id.namespace)
            .into_iter()
            .filter(|svc| labels.iter().any(|l| svc.selects(l)))
            .flat_map(|svc| referencing_service(store, admission, &id.namespace, &svc.id.name))
            .collect(),

        Change::Secret(id) => {
            secrets::find_resources_referencing_secret(store, admission, &id.namespace, &id.name)
        }
    }
}

fn referencing_service<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    namespace: &str,
    service: &str,
) -> BTreeSet<ResourceId> {
    store
        .routing_resources_in(namespace)
        .into_iter()
        .filter(|r| admission.owns(r) && r.references_service(service))
        .map(|r| r.id.clone())
        .collect()
}
