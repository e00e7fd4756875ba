pub mod classify;
pub mod embedded;
pub mod normalize;

use serde_json::Value;

use crate::model::{ContentItem, MAX_ITEMS};
use normalize::{normalize_item, UrlFallback};

/// Normalize `browse.browse_list` from a listing page (charts, playlists, artists).
///
/// `kind` keeps only items whose raw `type` matches. Urls fall back to empty.
pub fn browse_items(tree: &Value, kind: Option<&str>) -> Vec<ContentItem> {
    let Some(list) = tree
        .get("browse")
        .and_then(|b| b.get("browse_list"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    list.iter()
        .filter(|raw| kind.map_or(true, |k| raw.get("type").and_then(Value::as_str) == Some(k)))
        .filter_map(|raw| normalize_item(raw, UrlFallback::Empty))
        .take(MAX_ITEMS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn browse_items_filters_by_type() {
        let tree = json!({ "browse": { "browse_list": [
            { "id": "1", "type": "artist", "title": "A" },
            { "id": "2", "type": "playlist", "title": "P" },
            { "id": "3", "type": "artist", "title": "" }
        ] } });
        let artists = browse_items(&tree, Some("artist"));
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].id, "1");
        assert_eq!(browse_items(&tree, None).len(), 2);
    }

    #[test]
    fn browse_items_caps_and_tolerates_missing_list() {
        let list: Vec<Value> = (0..30).map(|i| json!({ "id": i, "title": "x" })).collect();
        let tree = json!({ "browse": { "browse_list": list } });
        assert_eq!(browse_items(&tree, None).len(), MAX_ITEMS);
        assert!(browse_items(&json!({ "browse": {} }), None).is_empty());
    }
}
