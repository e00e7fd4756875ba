use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use super::normalize::{normalize_item, UrlFallback};
use crate::model::{Bucket, ContentItem, HomepageSnapshot, Module, MAX_ITEMS};

static WORD_START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w").unwrap());

/// Routing rules on the lower-cased module key. First match wins; keys may satisfy several.
const RULES: &[(fn(&str) -> bool, Bucket)] = &[
    (|k: &str| k.contains("trending") && !k.contains("podcast"), Bucket::TrendingNow),
    (
        |k: &str| k.contains("chart") || k == "top_playlists" || k == "playlist_discover_v2",
        Bucket::TopCharts,
    ),
    (|k: &str| k.contains("new_") && !k.contains("pop"), Bucket::NewReleases),
    (
        |k: &str| k.contains("editorial") || k.contains("picks") || k.contains("curated"),
        Bucket::EditorialPicks,
    ),
    (|k: &str| k.contains("podcast") && k.contains("trending"), Bucket::TrendingPodcasts),
    (|k: &str| k.contains("fresh") || k.contains("taaza"), Bucket::FreshHits),
    (
        |k: &str| k.contains("genre") || k.contains("mood") || k.contains("tag_"),
        Bucket::TopGenresMoods,
    ),
    (
        |k: &str| k.contains("90") || k.contains("decade") || k.contains("retro"),
        Bucket::BestOf90s,
    ),
    (|k: &str| k.contains("new") && k.contains("pop"), Bucket::NewReleasesPop),
];

/// Bucket for a module key, if any rule matches.
pub fn route(key: &str) -> Option<Bucket> {
    let key = key.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(&key))
        .map(|(_, bucket)| *bucket)
}

/// Walk `homeView.modules` and sort every usable module into buckets.
///
/// A tree without a module list classifies as an all-empty snapshot.
pub fn classify_homepage(tree: &Value, base_url: &str) -> HomepageSnapshot {
    let mut snapshot = HomepageSnapshot::default();
    let Some(modules) = tree
        .get("homeView")
        .and_then(|h| h.get("modules"))
        .and_then(Value::as_array)
    else {
        return snapshot;
    };

    for raw in modules {
        let Some(module) = build_module(raw, base_url) else {
            continue;
        };
        if let Some(bucket) = route(&module.key) {
            snapshot.bucket_mut(bucket).extend(module.items.iter().cloned());
        }
        snapshot.all_modules.push(module);
    }

    snapshot
}

fn build_module(raw: &Value, base_url: &str) -> Option<Module> {
    let key = raw.get("key").and_then(Value::as_str).filter(|k| !k.is_empty())?;
    let data = raw.get("data").and_then(Value::as_array)?;

    let items: Vec<ContentItem> = data
        .iter()
        .filter_map(|item| normalize_item(item, UrlFallback::Synthesize { base_url }))
        .take(MAX_ITEMS)
        .collect();
    if items.is_empty() {
        return None;
    }

    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format_module_key(key));
    let subtitle = raw
        .get("subtitle")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(Module {
        key: key.to_string(),
        title,
        subtitle,
        items,
    })
}

/// `new_trending` → `New Trending`.
pub fn format_module_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    WORD_START_RE
        .replace_all(&spaced, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}

// ── Tests ──
