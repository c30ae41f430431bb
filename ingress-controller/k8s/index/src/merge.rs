//! Aggregates mergeable routing resources.
//!
//! A master declares a virtual host (and its TLS and annotations) without any paths. Minions
//! declare paths for the same host. Each master is merged with every owned minion for its host,
//! in discovery order; when minions collide on a path, the earliest discovered minion wins.

use crate::{admission::Admission, error::Error};
use ahash::AHashSet as HashSet;
use ingress_controller_core::{MergedRoutingSet, Minion, Role, RoutingResource, SnapshotStore};
use std::sync::Arc;

/// Builds the merged host for a master.
pub fn merged_routing_set<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    master: Arc<RoutingResource>,
) -> Result<MergedRoutingSet, Error> {
    let host = validate_master(&master)?.to_string();

    let mut seen = HashSet::new();
    let minions = minions_for_master(store, admission, &host)
        .into_iter()
        .filter_map(|minion| {
            let paths = {
                let Some(http) = minion.rules.first().and_then(|r| r.http.as_ref()) else {
                    tracing::debug!(minion = %minion.id, "Skipping minion without HTTP rules");
                    return None;
                };
                http.paths
                    .iter()
                    .filter(|p| {
                        if seen.insert(p.path.clone()) {
                            return true;
                        }
                        tracing::debug!(
                            master = %master.id,
                            minion = %minion.id,
                            path = %p.path,
                            "Ignoring path already declared by another minion"
                        );
                        false
                    })
                    .cloned()
                    .collect()
            };
            Some(Minion {
                resource: minion,
                paths,
            })
        })
        .collect();

    Ok(MergedRoutingSet {
        host,
        master,
        minions,
    })
}

/// Checks that a master declares exactly one host and no paths, returning its host.
pub fn validate_master(master: &RoutingResource) -> Result<&str, Error> {
    if master.has_paths() {
        return Err(Error::MasterWithPaths(master.id.clone()));
    }
    master
        .mergeable_host()
        .ok_or_else(|| Error::MasterHostCount(master.id.clone(), master.rules.len()))
}

/// Lists the owned minions, in all namespaces, that attach to `host`.
pub fn minions_for_master<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    host: &str,
) -> Vec<Arc<RoutingResource>> {
    store
        .routing_resources()
        .into_iter()
        .filter(|r| r.role == Role::Minion && admission.owns(r))
        .filter(|r| r.mergeable_host() == Some(host))
        .collect()
}

/// Finds the first owned master, in discovery order, for the minion's host.
pub fn find_master_for_minion<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    minion: &RoutingResource,
) -> Result<Arc<RoutingResource>, Error> {
    let orphan = || Error::NoMasterForMinion(minion.id.clone());
    let host = minion.rules.first().map(|r| r.host.as_str()).ok_or_else(orphan)?;
    find_master_for_host(store, admission, host).ok_or_else(orphan)
}

/// Masters are matched on their first host so that an invalid master is still found, and then
/// rejected, rather than orphaning its minions silently.
pub(crate) fn find_master_for_host<S: SnapshotStore>(
    store: &S,
    admission: &Admission,
    host: &str,
) -> Option<Arc<RoutingResource>> {
    store.routing_resources().into_iter().find(|r| {
        r.role == Role::Master
            && admission.owns(r)
            && r.rules.first().map(|rule| rule.host.as_str()) == Some(host)
    })
}
