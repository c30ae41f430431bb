use crate::routing::{PathRule, ResourceId, RoutingResource};
use serde::Serialize;
use std::sync::Arc;

/// A master routing resource together with the minions that contribute paths to its host.
///
/// Built fresh for each reconciliation and never shared between them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergedRoutingSet {
    pub host: String,
    pub master: Arc<RoutingResource>,

    /// Minions in discovery order.
    pub minions: Vec<Minion>,
}

/// A minion's contribution to a merged host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Minion {
    /// The minion as it was observed. This record is never modified by a merge.
    pub resource: Arc<RoutingResource>,

    /// The minion's paths that survived de-duplication against earlier minions.
    pub paths: Vec<PathRule>,
}

impl MergedRoutingSet {
    /// Flattens the merged host into a single ordered list of paths, each attributed to the
    /// minion that contributed it.
    pub fn paths(&self) -> impl Iterator<Item = (&ResourceId, &PathRule)> + '_ {
        self.minions
            .iter()
            .flat_map(|m| m.paths.iter().map(move |p| (&m.resource.id, p)))
    }

    pub fn minion_ids(&self) -> impl Iterator<Item = &ResourceId> + '_ {
        self.minions.iter().map(|m| &m.resource.id)
    }
}
