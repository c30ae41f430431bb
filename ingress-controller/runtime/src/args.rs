use crate::{
    config::Configurator,
    index::{self, Admission, Index},
    k8s,
    metrics::ReconcileMetrics,
    reconcile::Reconciler,
};
use anyhow::{bail, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(name = "ingress", about = "An ingress resource controller")]
pub struct Args {
    #[clap(
        long,
        default_value = "ingress_controller=info,warn",
        env = "INGRESS_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The class of ingresses this controller handles.
    #[clap(long, default_value = "nginx")]
    ingress_class: String,

    /// Only handle ingresses that explicitly set the ingress class annotation.
    #[clap(long)]
    use_ingress_class_only: bool,

    /// Limits watches to a single namespace. All namespaces are watched by default.
    #[clap(long)]
    watch_namespace: Option<String>,
}

/// Spawns a task that feeds watch events for a resource type into the index.
macro_rules! spawn_watch {
    ($runtime:expr, $ns:expr, $index:expr, $ty:ty, $span:literal) => {
        match $ns {
            Some(ns) => {
                let events = $runtime.watch_namespaced::<$ty>(ns.clone(), watcher::Config::default());
                tokio::spawn(
                    kubert::index::namespaced($index.clone(), events)
                        .instrument(info_span!($span)),
                );
            }
            None => {
                let events = $runtime.watch_all::<$ty>(watcher::Config::default());
                tokio::spawn(
                    kubert::index::namespaced($index.clone(), events)
                        .instrument(info_span!($span)),
                );
            }
        }
    };
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            ingress_class,
            use_ingress_class_only,
            watch_namespace,
        } = self;

        let admission = Admission::new(ingress_class, use_ingress_class_only);
        let index = Index::shared();

        let mut prom = <Registry>::default();
        index::metrics::register(prom.sub_registry_with_prefix("index"), index.clone());
        let reconcile_metrics =
            ReconcileMetrics::register(prom.sub_registry_with_prefix("reconcile"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // Subscribe before any watch is started so that the initial state of every resource is
        // reconciled.
        let changes = index.write().subscribe();

        spawn_watch!(runtime, &watch_namespace, index, k8s::Ingress, "ingresses");
        spawn_watch!(runtime, &watch_namespace, index, k8s::Service, "services");
        spawn_watch!(runtime, &watch_namespace, index, k8s::Pod, "pods");
        spawn_watch!(runtime, &watch_namespace, index, k8s::Secret, "secrets");

        info!(
            class = %admission.class(),
            strict = use_ingress_class_only,
            namespace = watch_namespace.as_deref().unwrap_or("*"),
            "Watching ingresses"
        );

        let reconciler = Reconciler::new(
            index,
            admission,
            Configurator::new(),
            reconcile_metrics,
        );
        tokio::spawn(
            reconciler
                .run(changes, runtime.shutdown_handle())
                .instrument(info_span!("reconciler")),
        );

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
