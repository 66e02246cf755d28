use std::sync::Arc;

use wl_core::{
    config::Config,
    registry::{
        store::{JsonFileStore, MemoryStore, RegistryStore},
        LinkRegistry,
    },
};

#[tokio::main]
async fn main() -> Result<(), wl_core::Error> {
    wl_core::logging::init("wl")?;

    let cfg = Arc::new(Config::load()?);

    let store: Box<dyn RegistryStore> = match &cfg.storage_file {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore),
    };
    let registry = Arc::new(LinkRegistry::new(store));

    wl_telegram::router::run(cfg, registry)
        .await
        .map_err(|e| wl_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
