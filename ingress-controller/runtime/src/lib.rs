pub use ingress_controller_core as core;
pub use ingress_controller_k8s_api as k8s;
pub use ingress_controller_k8s_index as index;

mod args;
mod config;
mod metrics;
mod queue;
mod reconcile;

pub use self::{
    args::Args,
    config::{ConfigSink, Configurator},
    metrics::ReconcileMetrics,
    reconcile::{Outcome, Reconciler},
};
