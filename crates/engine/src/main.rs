use std::sync::Arc;

use anyhow::Context;
use hotspot_engine::scenario::{self, Scenario};
use hotspot_engine::{EngineConfig, HotspotStore};
use hotspot_events::EventBus;
use hotspot_sync::{BackendSyncAdapter, HttpSyncAdapter, MemorySyncAdapter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotspot_engine=info,hotspot_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: hotspot-replay <scenario.json>")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read scenario {path}"))?;
    let scenario = Scenario::from_json(&raw)?;

    let config = EngineConfig::from_env()?;
    let adapter: Arc<dyn BackendSyncAdapter> = match &config.api_url {
        Some(url) => {
            let mut http = HttpSyncAdapter::new(url.as_str(), config.request_timeout)?;
            if let Some(token) = &config.api_token {
                http = http.with_token(token.as_str());
            }
            tracing::info!(api_url = %url, "Using HTTP backend");
            Arc::new(http)
        }
        None => {
            tracing::info!("HOTSPOT_API_URL not set, using in-memory backend");
            Arc::new(MemorySyncAdapter::new())
        }
    };

    let store = HotspotStore::new(&config, adapter, Arc::new(EventBus::default()));
    if let Err(e) = store.load().await {
        tracing::warn!(error = %e, "Starting from an empty collection");
    }

    let hotspots = scenario::run(&scenario, &store).await?;
    tracing::info!(count = hotspots.len(), "Scenario finished");
    println!("{}", serde_json::to_string_pretty(&hotspots)?);

    Ok(())
}
