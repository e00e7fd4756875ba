use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::cache::Cache;
use crate::fetcher::PageFetcher;
use crate::scraper::Scraper;

/// Scrape immediately, then once per `every`. A failed cycle is logged and left
/// for the next tick.
pub async fn run_scrape_loop<F: PageFetcher>(
    scraper: Arc<Scraper<F>>,
    cache: Arc<Cache>,
    every: Duration,
) {
    info!("Scrape job scheduled every {:.1}h", every.as_secs_f64() / 3600.0);
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        info!("Scrape job triggered");
        match scraper.scrape_and_store(&cache).await {
            Ok(_) => info!("Scrape job completed successfully"),
            Err(e) => error!("Scrape job failed: {}", e),
        }
    }
}

/// Ping our own public root so the host does not idle us out.
pub async fn run_keepalive(url: String, every: Duration) {
    info!("Keep-alive scheduled for {} every {}s", url, every.as_secs());
    let client = reqwest::Client::new();
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick fires immediately; skip it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let at = Local::now().format("%I:%M:%S %p").to_string();
        match ping(&client, &url).await {
            Ok(true) => info!("Keep-alive ping succeeded at {}", at),
            Ok(false) => warn!("Keep-alive ping at {} got an unexpected response", at),
            Err(e) => error!("Keep-alive ping failed at {}: {}", at, e),
        }
    }
}

async fn ping(client: &reqwest::Client, url: &str) -> Result<bool> {
    let text = client.get(url).send().await?.text().await?;
    let body: serde_json::Value = serde_json::from_str(&text)?;
    Ok(body.get("success").and_then(|s| s.as_bool()).unwrap_or(false))
}
