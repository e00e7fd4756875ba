use serde_json::Value;

use crate::model::ContentItem;

/// How to fill `url` when the item carries no `perma_url`.
#[derive(Debug, Clone, Copy)]
pub enum UrlFallback<'a> {
    /// Join the site base with the title's `action` path.
    Synthesize { base_url: &'a str },
    /// Leave it empty.
    Empty,
}

/// Coerce one raw item into a `ContentItem`. `None` when `id` or `title` is missing.
pub fn normalize_item(raw: &Value, fallback: UrlFallback) -> Option<ContentItem> {
    let id = scalar_string(raw.get("id")?)?;
    let title = rich_text(raw.get("title")?)?;

    let url = match raw.get("perma_url").and_then(non_empty_str) {
        Some(perma) => perma.to_string(),
        None => match fallback {
            UrlFallback::Synthesize { base_url } => {
                let action = raw
                    .get("title")
                    .and_then(|t| t.get("action"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                format!("{}{}", base_url, action)
            }
            UrlFallback::Empty => String::new(),
        },
    };

    Some(ContentItem {
        id,
        title,
        url,
        image: raw.get("image").and_then(pick_image),
        subtitle: raw.get("subtitle").and_then(rich_text).unwrap_or_default(),
        item_type: raw.get("type").and_then(Value::as_str).map(str::to_string),
        followers: raw.get("be_subtitle").and_then(first_subtitle_text),
    })
}

/// Text of a rich-text object (`{"text": ..}`) or the plain string itself.
/// Lists count as absent.
fn rich_text(v: &Value) -> Option<String> {
    match v {
        Value::Object(map) => map.get("text").and_then(non_empty_str).map(str::to_string),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Image lists run smallest to largest; keep the last.
fn pick_image(v: &Value) -> Option<String> {
    match v {
        Value::Array(variants) => variants.last().and_then(Value::as_str).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn first_subtitle_text(v: &Value) -> Option<String> {
    v.as_array()?
        .first()?
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn non_empty_str(v: &Value) -> Option<&str> {
    v.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://www.jiosaavn.com";

    fn homepage(raw: Value) -> Option<ContentItem> {
        normalize_item(&raw, UrlFallback::Synthesize { base_url: BASE })
    }

    #[test]
    fn rich_title_and_synthesized_url() {
        let item = homepage(json!({
            "id": "aBc12",
            "type": "song",
            "title": { "text": "Tum Hi Ho", "action": "/song/tum-hi-ho/aBc12" },
            "subtitle": { "text": "Arijit Singh" },
            "image": ["https://c.saavncdn.com/50x50.jpg", "https://c.saavncdn.com/500x500.jpg"]
        }))
        .unwrap();
        assert_eq!(item.title, "Tum Hi Ho");
        assert_eq!(item.url, "https://www.jiosaavn.com/song/tum-hi-ho/aBc12");
        assert_eq!(item.subtitle, "Arijit Singh");
        assert_eq!(item.image.as_deref(), Some("https://c.saavncdn.com/500x500.jpg"));
        assert_eq!(item.item_type.as_deref(), Some("song"));
        assert!(item.followers.is_none());
    }

    #[test]
    fn perma_url_wins_over_synthesized() {
        let item = homepage(json!({
            "id": "x1",
            "title": { "text": "Chart", "action": "/ignored" },
            "perma_url": "https://www.jiosaavn.com/featured/chart/x1"
        }))
        .unwrap();
        assert_eq!(item.url, "https://www.jiosaavn.com/featured/chart/x1");
    }

    #[test]
    fn empty_fallback_leaves_url_blank() {
        let item = normalize_item(&json!({ "id": "x1", "title": "Plain" }), UrlFallback::Empty).unwrap();
        assert_eq!(item.title, "Plain");
        assert_eq!(item.url, "");
        assert!(item.image.is_none());
    }

    #[test]
    fn missing_required_fields_drop_item() {
        let cases = [
            json!({ "title": "No id" }),
            json!({ "id": "", "title": "Empty id" }),
            json!({ "id": "a1" }),
            json!({ "id": "a1", "title": "" }),
            json!({ "id": "a1", "title": { "action": "/x" } }),
            json!({ "id": "a1", "title": ["not", "text"] }),
            json!("not even an object"),
        ];
        for raw in cases {
            assert!(homepage(raw.clone()).is_none(), "expected drop for {}", raw);
        }
    }

    #[test]
    fn image_list_takes_last_entry() {
        for n in 1..=4 {
            let images: Vec<String> = (0..n).map(|i| format!("img{}", i)).collect();
            let item = homepage(json!({ "id": "a", "title": "t", "image": images })).unwrap();
            assert_eq!(item.image, Some(format!("img{}", n - 1)));
        }
        let scalar = homepage(json!({ "id": "a", "title": "t", "image": "one.jpg" })).unwrap();
        assert_eq!(scalar.image.as_deref(), Some("one.jpg"));
        let empty = homepage(json!({ "id": "a", "title": "t", "image": [] })).unwrap();
        assert!(empty.image.is_none());
    }

    #[test]
    fn list_subtitle_is_blank() {
        let item = homepage(json!({ "id": "a", "title": "t", "subtitle": [{ "text": "x" }] })).unwrap();
        assert_eq!(item.subtitle, "");
        let plain = homepage(json!({ "id": "a", "title": "t", "subtitle": "Plain sub" })).unwrap();
        assert_eq!(plain.subtitle, "Plain sub");
    }

    #[test]
    fn followers_from_first_be_subtitle() {
        let item = homepage(json!({
            "id": "p1",
            "title": "Playlist",
            "be_subtitle": [{ "text": "1.2M Followers" }, { "text": "ignored" }]
        }))
        .unwrap();
        assert_eq!(item.followers.as_deref(), Some("1.2M Followers"));
        let none = homepage(json!({ "id": "p1", "title": "Playlist", "be_subtitle": [] })).unwrap();
        assert!(none.followers.is_none());
    }

    #[test]
    fn numeric_id_becomes_string() {
        let item = homepage(json!({ "id": 1234567, "title": "Album" })).unwrap();
        assert_eq!(item.id, "1234567");
    }
}
