use crate::{
    core::ResourceId,
    index::{Error, Resolution},
};
use ahash::AHashMap as HashMap;

/// Receives resolved configurations for rendering.
///
/// Configurations are keyed by [`Resolution::id`], i.e. by the standalone resource or by the
/// master of a merged host.
pub trait ConfigSink {
    fn apply(&mut self, resolution: Resolution);

    /// Drops any configuration or rejection held for the resource.
    fn remove(&mut self, id: &ResourceId);

    /// Drops the resource's configuration and records why it could not be generated.
    fn reject(&mut self, id: &ResourceId, error: &Error);
}

/// Holds the current configuration for every resolved resource in memory.
#[derive(Debug, Default)]
pub struct Configurator {
    configs: HashMap<ResourceId, Resolution>,
    rejected: HashMap<ResourceId, String>,
}

impl Configurator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing set of configurations.
    pub fn with_configs(configs: HashMap<ResourceId, Resolution>) -> Self {
        Self {
            configs,
            rejected: HashMap::default(),
        }
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Resolution> {
        self.configs.get(id)
    }

    pub fn rejection(&self, id: &ResourceId) -> Option<&str> {
        self.rejected.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl ConfigSink for Configurator {
    fn apply(&mut self, resolution: Resolution) {
        let id = resolution.id().clone();
        match serde_json::to_string(&resolution) {
            Ok(json) => tracing::debug!(%id, config = %json, "Applying configuration"),
            Err(error) => tracing::warn!(%id, %error, "Failed to render configuration"),
        }

        if let Resolution::Merged(merged) = &resolution {
            for minion in merged.merged.minion_ids() {
                self.rejected.remove(minion);
            }
        }
        self.rejected.remove(&id);
        self.configs.insert(id, resolution);
    }

    fn remove(&mut self, id: &ResourceId) {
        let removed = self.configs.remove(id).is_some();
        let unrejected = self.rejected.remove(id).is_some();
        if removed || unrejected {
            tracing::debug!(%id, "Removed configuration");
        }
    }

    fn reject(&mut self, id: &ResourceId, error: &Error) {
        tracing::warn!(%id, %error, "Rejected resource");
        self.configs.remove(id);
        self.rejected.insert(id.clone(), error.to_string());
    }
}
