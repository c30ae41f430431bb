use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug, Default)]
pub struct ReconcileMetrics {
    changes: Counter,
    reconciles: Family<OutcomeLabels, Counter>,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct OutcomeLabels {
    outcome: &'static str,
}

impl ReconcileMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let changes = Counter::default();
        reg.register(
            "changes",
            "Total number of index changes observed",
            changes.clone(),
        );

        let reconciles = Family::<OutcomeLabels, Counter>::default();
        reg.register(
            "reconciles",
            "Total number of resources reconciled, by outcome",
            reconciles.clone(),
        );

        Self {
            changes,
            reconciles,
        }
    }

    pub(crate) fn change(&self) {
        self.changes.inc();
    }

    pub(crate) fn reconciled(&self, outcome: &'static str) {
        self.reconciles
            .get_or_create(&OutcomeLabels { outcome })
            .inc();
    }
}
