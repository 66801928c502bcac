#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use farm_manager::{FarmConfig, InventoryStore, JsonInventoryStore, http_api, logging};
    use std::sync::Arc;

    let config = FarmConfig::from_env()?;
    logging::init(&config.log_level);

    let store = JsonInventoryStore::new(&config.resource_data_path)?;
    let inventory = store.load_inventory()?.unwrap_or_default();
    let addr = config.http_addr()?;

    let state = http_api::AppState::with_store(inventory, Arc::new(store));

    println!("farm-manager HTTP API listening on http://{addr}");
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
