use crate::{
    config::ConfigSink,
    core::{Change, ResourceId},
    index::{self, Admission, SharedIndex},
    metrics::ReconcileMetrics,
    queue::Queue,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Re-resolves the resources affected by index changes and publishes the results to a sink.
#[derive(Debug)]
pub struct Reconciler<S> {
    index: SharedIndex,
    admission: Admission,
    sink: S,
    queue: Queue,
    metrics: ReconcileMetrics,
}

/// What reconciling a resource did to the sink.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Removed,
    Rejected,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Removed => "removed",
            Self::Rejected => "rejected",
        }
    }
}

impl<S: ConfigSink> Reconciler<S> {
    pub fn new(
        index: SharedIndex,
        admission: Admission,
        sink: S,
        metrics: ReconcileMetrics,
    ) -> Self {
        Self {
            index,
            admission,
            sink,
            queue: Queue::default(),
            metrics,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Processes changes until the change stream ends or shutdown is signaled.
    ///
    /// All pending changes are drained before any resource is reconciled, so that a burst of
    /// changes reconciles each affected resource once.
    pub async fn run(mut self, mut changes: mpsc::UnboundedReceiver<Change>, drain: drain::Watch) {
        let shutdown = drain.signaled();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _release = &mut shutdown => {
                    debug!(pending = self.queue.len(), "Shutting down");
                    return;
                }

                change = changes.recv() => {
                    let Some(change) = change else {
                        info!("Change stream ended");
                        return;
                    };
                    self.enqueue(&change);
                    while let Ok(change) = changes.try_recv() {
                        self.enqueue(&change);
                    }
                    self.process();
                }
            }
        }
    }

    /// Queues the resources affected by a change.
    pub fn enqueue(&mut self, change: &Change) {
        self.metrics.change();
        let affected = {
            let index = self.index.read();
            index::affected_resources(&*index, &self.admission, change)
        };
        for id in affected {
            self.queue.push(id);
        }
    }

    /// Reconciles every queued resource.
    pub fn process(&mut self) {
        while let Some(id) = self.queue.pop() {
            let outcome = self.reconcile(&id);
            self.metrics.reconciled(outcome.as_str());
        }
    }

    /// Resolves a resource against a snapshot of the index and publishes the result.
    #[instrument(skip_all, fields(%id))]
    pub fn reconcile(&mut self, id: &ResourceId) -> Outcome {
        let resolution = {
            let index = self.index.read();
            index::resolve(&*index, &self.admission, id)
        };

        match resolution {
            Ok(Some(resolution)) => {
                // A minion's configuration is held by its master.
                if resolution.id() != id {
                    self.sink.remove(id);
                }
                debug!(key = %resolution.id(), "Resolved");
                self.sink.apply(resolution);
                Outcome::Applied
            }
            Ok(None) => {
                self.sink.remove(id);
                Outcome::Removed
            }
            Err(error) => {
                if error.resource() != id {
                    self.sink.remove(id);
                }
                self.sink.reject(error.resource(), &error);
                Outcome::Rejected
            }
        }
    }
}
