//! Ingress Controller Index
//!
//! The index mirrors the cluster objects that determine how ingress traffic is routed:
//!
//! - Each `Ingress` declares hosts and paths. Ingresses may be annotated as a _master_, which
//!   declares a host without paths, or as a _minion_, which contributes paths to its master's
//!   host.
//! - Each `Service` exposes ports and selects the `Pod`s that back it.
//! - Each `Pod` declares container ports and readiness probes, from which upstream endpoints and
//!   health checks are derived.
//! - Each `Secret` may be referenced by an ingress as a TLS certificate or as a JSON Web Key.
//!
//! ```text
//! [ Secret ] <- [ Ingress ] -> [ Service ] -> [ Pod ]
//!                   ^
//!              [ Minion ] (by host)
//! ```
//!
//! Resolution is a pure computation over a locked snapshot of the index. Every change to the
//! index is published so that the affected ingresses can be resolved again.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod admission;
mod dependents;
mod error;
mod index;
pub mod ingress;
pub mod merge;
pub mod metrics;
pub mod ports;
mod resolve;
pub mod secrets;
mod workload;

#[cfg(test)]
mod tests;

pub use self::{
    admission::{owns, Admission},
    dependents::affected_resources,
    error::{BackendError, Error, SecretError},
    index::{Index, SharedIndex},
    resolve::{resolve, Resolution, ResolvedBackend, ResolvedIngress, ResolvedMergeable},
    secrets::find_resources_referencing_secret,
};
