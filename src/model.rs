use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Max entries kept per module and per top-level list.
pub const MAX_ITEMS: usize = 20;

/// One normalized item (song, album, playlist, artist, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub subtitle: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<String>,
}

impl ContentItem {
    /// Drop the homepage-only tags, keeping the plain release/chart shape.
    pub fn into_plain(self) -> ContentItem {
        ContentItem {
            item_type: None,
            followers: None,
            ..self
        }
    }

    pub fn is_type(&self, kind: &str) -> bool {
        self.item_type.as_deref() == Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistEntry {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub fans: String,
}

impl From<ContentItem> for ArtistEntry {
    fn from(item: ContentItem) -> Self {
        ArtistEntry {
            id: item.id,
            name: item.title,
            url: item.url,
            image: item.image,
            fans: item.subtitle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub items: Vec<ContentItem>,
}

/// Homepage modules routed into the fixed buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageSnapshot {
    pub trending_now: Vec<ContentItem>,
    pub top_charts: Vec<ContentItem>,
    pub new_releases: Vec<ContentItem>,
    pub editorial_picks: Vec<ContentItem>,
    pub trending_podcasts: Vec<ContentItem>,
    pub fresh_hits: Vec<ContentItem>,
    pub top_genres_moods: Vec<ContentItem>,
    pub best_of_90s: Vec<ContentItem>,
    pub new_releases_pop: Vec<ContentItem>,
    pub all_modules: Vec<Module>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    TrendingNow,
    TopCharts,
    NewReleases,
    EditorialPicks,
    TrendingPodcasts,
    FreshHits,
    TopGenresMoods,
    BestOf90s,
    NewReleasesPop,
}

impl Bucket {
    pub const ALL: [Bucket; 9] = [
        Bucket::TrendingNow,
        Bucket::TopCharts,
        Bucket::NewReleases,
        Bucket::EditorialPicks,
        Bucket::TrendingPodcasts,
        Bucket::FreshHits,
        Bucket::TopGenresMoods,
        Bucket::BestOf90s,
        Bucket::NewReleasesPop,
    ];

    /// Field name as serialized in the homepage snapshot.
    pub fn name(self) -> &'static str {
        match self {
            Bucket::TrendingNow => "trendingNow",
            Bucket::TopCharts => "topCharts",
            Bucket::NewReleases => "newReleases",
            Bucket::EditorialPicks => "editorialPicks",
            Bucket::TrendingPodcasts => "trendingPodcasts",
            Bucket::FreshHits => "freshHits",
            Bucket::TopGenresMoods => "topGenresMoods",
            Bucket::BestOf90s => "bestOf90s",
            Bucket::NewReleasesPop => "newReleasesPop",
        }
    }
}

impl HomepageSnapshot {
    pub fn bucket(&self, bucket: Bucket) -> &[ContentItem] {
        match bucket {
            Bucket::TrendingNow => &self.trending_now,
            Bucket::TopCharts => &self.top_charts,
            Bucket::NewReleases => &self.new_releases,
            Bucket::EditorialPicks => &self.editorial_picks,
            Bucket::TrendingPodcasts => &self.trending_podcasts,
            Bucket::FreshHits => &self.fresh_hits,
            Bucket::TopGenresMoods => &self.top_genres_moods,
            Bucket::BestOf90s => &self.best_of_90s,
            Bucket::NewReleasesPop => &self.new_releases_pop,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<ContentItem> {
        match bucket {
            Bucket::TrendingNow => &mut self.trending_now,
            Bucket::TopCharts => &mut self.top_charts,
            Bucket::NewReleases => &mut self.new_releases,
            Bucket::EditorialPicks => &mut self.editorial_picks,
            Bucket::TrendingPodcasts => &mut self.trending_podcasts,
            Bucket::FreshHits => &mut self.fresh_hits,
            Bucket::TopGenresMoods => &mut self.top_genres_moods,
            Bucket::BestOf90s => &mut self.best_of_90s,
            Bucket::NewReleasesPop => &mut self.new_releases_pop,
        }
    }
}

/// Everything one scrape cycle produces. Written to the cache as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSnapshot {
    pub new_releases: Vec<ContentItem>,
    pub top_charts: Vec<ContentItem>,
    pub top_playlists: Vec<ContentItem>,
    pub top_artists: Vec<ArtistEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page: Option<HomepageSnapshot>,
    #[serde(with = "millis_timestamp")]
    pub scraped_at: DateTime<Utc>,
}

impl ScrapeSnapshot {
    /// Timestamp as stored under the last-scraped key.
    pub fn scraped_at_string(&self) -> String {
        millis_timestamp::format(&self.scraped_at)
    }
}

mod millis_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }
}
