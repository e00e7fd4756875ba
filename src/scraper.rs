use chrono::Utc;
use tracing::{info, warn};

use crate::cache::Cache;
use crate::error::CacheError;
use crate::fetcher::PageFetcher;
use crate::model::{ArtistEntry, ContentItem, HomepageSnapshot, ScrapeSnapshot, MAX_ITEMS};
use crate::parser::{browse_items, classify, embedded};

const HOME_PATH: &str = "/";
const CHARTS_PATH: &str = "/charts";
const PLAYLISTS_PATH: &str = "/featured-playlists";
const ARTISTS_PATH: &str = "/top-artists";

/// Homepage modules feeding the new-releases list.
const RELEASE_KEY_MARKERS: &[&str] = &["new_trending", "new_", "trending"];

/// Song ids contain letters; purely numeric ids belong to albums.
pub fn is_valid_song_id(id: &str) -> bool {
    id.chars().any(|c| c.is_ascii_alphabetic())
}

pub struct Scraper<F> {
    fetcher: F,
    base_url: String,
}

impl<F: PageFetcher> Scraper<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        Scraper {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_tree(&self, path: &str) -> Option<serde_json::Value> {
        let url = self.url(path);
        let html = self.fetcher.fetch(&url).await?;
        let tree = embedded::extract_initial_data(&html);
        if tree.is_none() {
            warn!("No embedded data extracted from {}", url);
        }
        tree
    }

    pub async fn scrape_homepage(&self) -> HomepageSnapshot {
        let Some(tree) = self.fetch_tree(HOME_PATH).await else {
            return HomepageSnapshot::default();
        };
        let snapshot = classify::classify_homepage(&tree, &self.base_url);
        info!("Scraped homepage with {} modules", snapshot.all_modules.len());
        snapshot
    }

    pub async fn scrape_top_charts(&self) -> Vec<ContentItem> {
        let charts: Vec<ContentItem> = match self.fetch_tree(CHARTS_PATH).await {
            Some(tree) => browse_items(&tree, None)
                .into_iter()
                .map(ContentItem::into_plain)
                .collect(),
            None => Vec::new(),
        };
        info!("Scraped {} top charts", charts.len());
        charts
    }

    pub async fn scrape_top_playlists(&self) -> Vec<ContentItem> {
        let playlists = match self.fetch_tree(PLAYLISTS_PATH).await {
            Some(tree) => browse_items(&tree, Some("playlist")),
            None => Vec::new(),
        };
        info!("Scraped {} top playlists", playlists.len());
        playlists
    }

    pub async fn scrape_top_artists(&self) -> Vec<ArtistEntry> {
        let artists: Vec<ArtistEntry> = match self.fetch_tree(ARTISTS_PATH).await {
            Some(tree) => browse_items(&tree, Some("artist"))
                .into_iter()
                .map(ArtistEntry::from)
                .collect(),
            None => Vec::new(),
        };
        info!("Scraped {} top artists", artists.len());
        artists
    }

    /// One full cycle: homepage first, then charts/playlists/artists concurrently.
    pub async fn scrape_all(&self) -> ScrapeSnapshot {
        info!("Starting scrape of {}", self.base_url);

        let home_page = self.scrape_homepage().await;
        let new_releases = new_releases_from(&home_page);

        // Each branch resolves to an empty list on its own failure.
        let (top_charts, top_playlists, top_artists) = tokio::join!(
            self.scrape_top_charts(),
            self.scrape_top_playlists(),
            self.scrape_top_artists(),
        );

        info!(
            "Scrape completed - New Releases: {}, Charts: {}, Playlists: {}, Artists: {}, HomePage Modules: {}",
            new_releases.len(),
            top_charts.len(),
            top_playlists.len(),
            top_artists.len(),
            home_page.all_modules.len(),
        );

        ScrapeSnapshot {
            new_releases,
            top_charts,
            top_playlists,
            top_artists,
            home_page: Some(home_page),
            scraped_at: Utc::now(),
        }
    }

    pub async fn scrape_and_store(&self, cache: &Cache) -> Result<ScrapeSnapshot, CacheError> {
        let snapshot = self.scrape_all().await;
        cache.store_snapshot(&snapshot)?;
        info!("Snapshot stored in cache");
        Ok(snapshot)
    }
}

/// Songs with letter-bearing ids from release-ish homepage modules, capped.
fn new_releases_from(home: &HomepageSnapshot) -> Vec<ContentItem> {
    home.all_modules
        .iter()
        .filter(|m| {
            let key = m.key.to_lowercase();
            RELEASE_KEY_MARKERS.iter().any(|marker| key.contains(marker))
        })
        .flat_map(|m| &m.items)
        .filter(|item| item.is_type("song") && is_valid_song_id(&item.id))
        .take(MAX_ITEMS)
        .cloned()
        .map(ContentItem::into_plain)
        .collect()
}
