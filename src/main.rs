mod api;
mod cache;
mod config;
mod error;
mod fetcher;
mod model;
mod parser;
mod scheduler;
mod scraper;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::cache::Cache;
use crate::config::Settings;
use crate::fetcher::HttpFetcher;
use crate::model::Bucket;
use crate::scraper::Scraper;

#[derive(Parser)]
#[command(name = "saavn_scraper", about = "JioSaavn homepage/charts scraper with a cached read API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler, keep-alive pinger and read API until Ctrl-C
    Serve,
    /// Scrape once and store the snapshot
    Scrape,
    /// Print one cached section as the API would serve it
    Show {
        #[arg(value_enum, default_value = "all")]
        section: Section,
    },
    /// Show counts for the cached snapshot
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum Section {
    All,
    NewReleases,
    TopCharts,
    TopPlaylists,
    TopArtists,
    Homepage,
    LastScraped,
}

impl Section {
    fn api_path(self) -> &'static str {
        match self {
            Section::All => "/api/jiosaavn",
            Section::NewReleases => "/api/jiosaavn/new-releases",
            Section::TopCharts => "/api/jiosaavn/top-charts",
            Section::TopPlaylists => "/api/jiosaavn/top-playlists",
            Section::TopArtists => "/api/jiosaavn/top-artists",
            Section::Homepage => "/api/jiosaavn/homepage",
            Section::LastScraped => "/api/jiosaavn/last-scraped",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Serve => serve(&settings).await,
        Commands::Scrape => {
            let cache = open_cache(&settings)?;
            let scraper = Scraper::new(HttpFetcher::new(settings.fetch_timeout())?, &settings.base_url);
            let snap = scraper.scrape_and_store(&cache).await?;
            println!(
                "Stored snapshot: {} new releases, {} charts, {} playlists, {} artists, {} homepage modules",
                snap.new_releases.len(),
                snap.top_charts.len(),
                snap.top_playlists.len(),
                snap.top_artists.len(),
                snap.home_page.as_ref().map_or(0, |h| h.all_modules.len()),
            );
            cache.close()?;
            Ok(())
        }
        Commands::Show { section } => {
            let cache = open_cache(&settings)?;
            let res = api::respond(&cache, section.api_path());
            println!("{}", serde_json::to_string_pretty(&res.body)?);
            cache.close()?;
            if res.status != 200 {
                anyhow::bail!("{} responded with status {}", section.api_path(), res.status);
            }
            Ok(())
        }
        Commands::Stats => {
            let cache = open_cache(&settings)?;
            let Some(snap) = cache.load_snapshot()? else {
                println!("No snapshot cached yet. Run 'scrape' first.");
                return Ok(());
            };
            println!("Scraped at:    {}", snap.scraped_at_string());
            println!("New releases:  {}", snap.new_releases.len());
            println!("Top charts:    {}", snap.top_charts.len());
            println!("Top playlists: {}", snap.top_playlists.len());
            println!("Top artists:   {}", snap.top_artists.len());
            if let Some(home) = &snap.home_page {
                println!("\n--- Homepage ({} modules) ---", home.all_modules.len());
                for bucket in Bucket::ALL {
                    println!("  {:<18} {:>3}", bucket.name(), home.bucket(bucket).len());
                }
            }
            cache.close()?;
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn open_cache(settings: &Settings) -> anyhow::Result<Cache> {
    let path = Path::new(&settings.db_path);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory {:?}", dir))?;
    }
    Cache::connect(path).with_context(|| format!("Failed to open cache at {:?}", path))
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let cache = Arc::new(open_cache(settings)?);
    let scraper = Arc::new(Scraper::new(
        HttpFetcher::new(settings.fetch_timeout())?,
        &settings.base_url,
    ));

    let scrape_task = tokio::spawn(scheduler::run_scrape_loop(
        scraper,
        Arc::clone(&cache),
        settings.scrape_interval(),
    ));
    let keepalive_task = settings
        .keepalive_url
        .clone()
        .map(|url| tokio::spawn(scheduler::run_keepalive(url, settings.keepalive_interval())));

    let listener = tokio::net::TcpListener::bind(settings.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr()))?;

    let served = tokio::select! {
        res = api::serve(listener, Arc::clone(&cache)) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping");
            Ok(())
        }
    };

    scrape_task.abort();
    let _ = scrape_task.await;
    if let Some(task) = keepalive_task {
        task.abort();
        let _ = task.await;
    }

    match Arc::try_unwrap(cache) {
        Ok(cache) => cache.close()?,
        Err(_) => warn!("Cache still in use by open connections; dropping without explicit close"),
    }

    served
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
