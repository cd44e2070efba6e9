//! Wiring from configuration to a ready registry

use anyhow::Context;
use cloudgrid_config::{Config, StoreBackend};
use cloudgrid_proxy::{SpiderClient, SpiderConfig};
use cloudgrid_registry::{Coordinates, RegionTable, Registry};
use cloudgrid_store::{FileStore, KvStore, MemoryStore};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let config = match explicit {
        Some(path) => {
            let mut config = Config::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config.validate()?;
            config
        }
        None => Config::discover().context("failed to load config")?,
    };
    Ok(config)
}

pub fn build_registry(config: &Config) -> anyhow::Result<Registry> {
    let store: Arc<dyn KvStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => {
            let path = config.store.resolved_path();
            debug!(path = %path.display(), "Using file store");
            Arc::new(FileStore::new(path))
        }
    };

    let proxy = SpiderClient::new(SpiderConfig {
        endpoint: config.proxy.endpoint.clone(),
        username: config.proxy.username.clone(),
        password: config.proxy.password.clone(),
    })
    .context("failed to create proxy client")?;

    let regions: RegionTable = config
        .regions
        .iter()
        .map(|(name, loc)| (name.clone(), Coordinates::new(loc.latitude, loc.longitude)))
        .collect();

    Ok(Registry::new(store, Arc::new(proxy)).with_regions(regions))
}
