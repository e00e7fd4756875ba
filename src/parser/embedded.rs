use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, error};

static INITIAL_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)window\.__INITIAL_DATA__\s*=\s*(\{.*?\});?\s*</script>").unwrap()
});
static DATE_CTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"new Date\("([^"]+)"\)"#).unwrap());
static UNDEFINED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":undefined([,}])").unwrap());

/// Pull the `window.__INITIAL_DATA__` object literal out of a page and parse it.
///
/// Returns `None` when the assignment is missing or the repaired literal is still
/// not valid JSON. Never yields a partial tree.
pub fn extract_initial_data(html: &str) -> Option<Value> {
    let Some(caps) = INITIAL_DATA_RE.captures(html) else {
        debug!("No __INITIAL_DATA__ marker in page");
        return None;
    };
    let repaired = repair_literal(&caps[1]);

    match serde_json::from_str(&repaired) {
        Ok(tree) => Some(tree),
        Err(e) => {
            error!("Failed to parse __INITIAL_DATA__: {}", e);
            None
        }
    }
}

/// Turn a script object literal into JSON: unwrap `new Date("..")` into its
/// string, then map `:undefined` before `,`/`}` to `:null`.
fn repair_literal(literal: &str) -> String {
    let dated = DATE_CTOR_RE.replace_all(literal, "\"${1}\"");
    UNDEFINED_RE.replace_all(&dated, ":null${1}").into_owned()
}
