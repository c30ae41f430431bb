use crate::index::{Namespace, SharedIndex};
use prometheus_client::{
    collector::Collector,
    encoding::{DescriptorEncoder, EncodeMetric},
    metrics::{gauge::ConstGauge, MetricType},
    registry::Registry,
};

#[derive(Debug)]
struct Instrumented(SharedIndex);

pub fn register(reg: &mut Registry, index: SharedIndex) {
    reg.register_collector(Box::new(Instrumented(index)));
}

type Len = fn(&Namespace) -> usize;

const SIZES: [(&str, &str, Len); 4] = [
    (
        "ingress_index_size",
        "The number of ingresses in index",
        |ns| ns.routing.len(),
    ),
    (
        "service_index_size",
        "The number of services in index",
        |ns| ns.services.len(),
    ),
    (
        "pod_index_size",
        "The number of pods in index",
        |ns| ns.pods.len(),
    ),
    (
        "secret_index_size",
        "The number of secrets in index",
        |ns| ns.secrets.len(),
    ),
];

impl Collector for Instrumented {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        let this = self.0.read();

        for (name, help, len) in SIZES {
            let mut family_encoder =
                encoder.encode_descriptor(name, help, None, MetricType::Gauge)?;
            for (ns, index) in &this.namespaces {
                let labels = [("namespace", ns.as_str())];
                let size = ConstGauge::new(len(index) as u32);
                let metric_encoder = family_encoder.encode_family(&labels)?;
                size.encode(metric_encoder)?;
            }
        }
        Ok(())
    }
}
