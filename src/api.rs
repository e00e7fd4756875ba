use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::cache::{self, Cache};

const API_PREFIX: &str = "/api/jiosaavn";

/// One read-only route backed by a single cache key.
struct Route {
    path: &'static str,
    key: &'static str,
    missing: &'static str,
    failed: &'static str,
}

const ROUTES: &[Route] = &[
    Route {
        path: "",
        key: cache::KEY_ALL,
        missing: "No data available. Scraping may not have run yet.",
        failed: "Failed to fetch data",
    },
    Route {
        path: "/new-releases",
        key: cache::KEY_NEW_RELEASES,
        missing: "No new releases data available",
        failed: "Failed to fetch new releases",
    },
    Route {
        path: "/top-charts",
        key: cache::KEY_TOP_CHARTS,
        missing: "No top charts data available",
        failed: "Failed to fetch top charts",
    },
    Route {
        path: "/top-playlists",
        key: cache::KEY_TOP_PLAYLISTS,
        missing: "No top playlists data available",
        failed: "Failed to fetch top playlists",
    },
    Route {
        path: "/top-artists",
        key: cache::KEY_TOP_ARTISTS,
        missing: "No top artists data available",
        failed: "Failed to fetch top artists",
    },
    Route {
        path: "/homepage",
        key: cache::KEY_HOME_PAGE,
        missing: "No homepage data available",
        failed: "Failed to fetch homepage data",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(data: Value) -> Self {
        ApiResponse {
            status: 200,
            body: json!({ "success": true, "data": data }),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: json!({ "success": false, "message": message.into() }),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }
}

/// Answer a GET for `path` from the cache.
pub fn respond(cache: &Cache, path: &str) -> ApiResponse {
    let path = path.split('?').next().unwrap_or_default();
    if path == "/" {
        return ApiResponse {
            status: 200,
            body: json!({ "success": true, "message": "Hello from root route" }),
        };
    }

    let sub = path
        .strip_prefix(API_PREFIX)
        .map(|rest| rest.trim_end_matches('/'));
    match sub {
        Some("/last-scraped") => last_scraped(cache),
        Some(sub) => match ROUTES.iter().find(|r| r.path == sub) {
            Some(route) => cached_json(cache, route),
            None => not_found(path),
        },
        None => not_found(path),
    }
}

fn not_found(path: &str) -> ApiResponse {
    ApiResponse::error(404, format!("Cannot find {} on this server", path))
}

fn cached_json(cache: &Cache, route: &Route) -> ApiResponse {
    let raw = match cache.get(route.key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ApiResponse::error(404, route.missing),
        Err(e) => {
            error!("Cache read for {} failed: {}", route.key, e);
            return ApiResponse::error(500, route.failed);
        }
    };
    match serde_json::from_str(&raw) {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            error!("Cached value under {} is not JSON: {}", route.key, e);
            ApiResponse::error(500, route.failed)
        }
    }
}

fn last_scraped(cache: &Cache) -> ApiResponse {
    match cache.get(cache::KEY_LAST_SCRAPED) {
        Ok(Some(ts)) => ApiResponse::ok(json!({ "lastScraped": ts })),
        Ok(None) => ApiResponse::error(404, "No scraping timestamp available"),
        Err(e) => {
            error!("Cache read for last-scraped failed: {}", e);
            ApiResponse::error(500, "Failed to fetch timestamp")
        }
    }
}

/// Accept connections until the listener errors. One task per connection.
pub async fn serve(listener: TcpListener, cache: Arc<Cache>) -> Result<()> {
    info!("Read API listening on {}", listener.local_addr()?);
    loop {
        let (stream, peer) = listener.accept().await?;
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &cache).await {
                warn!("Connection from {} failed: {}", peer, e);
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, cache: &Cache) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    if request_line.trim().is_empty() {
        return Ok(());
    }
    // Drain headers; no route reads them.
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or("/");
    debug!("{} {}", method, path);

    let response = if method == "GET" {
        respond(cache, path)
    } else {
        ApiResponse::error(405, format!("Method {} not allowed", method))
    };

    let body = serde_json::to_vec(&response.body)?;
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.reason(),
        body.len()
    );
    write_half.write_all(header.as_bytes()).await?;
    write_half.write_all(&body).await?;
    write_half.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn root_says_hello() {
        let cache = Cache::in_memory().unwrap();
        let res = respond(&cache, "/");
        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
    }

    #[test]
    fn missing_keys_are_not_found() {
        let cache = Cache::in_memory().unwrap();
        for path in [
            "/api/jiosaavn",
            "/api/jiosaavn/new-releases",
            "/api/jiosaavn/top-charts",
            "/api/jiosaavn/top-playlists",
            "/api/jiosaavn/top-artists",
            "/api/jiosaavn/homepage",
            "/api/jiosaavn/last-scraped",
        ] {
            let res = respond(&cache, path);
            assert_eq!(res.status, 404, "{}", path);
            assert_eq!(res.body["success"], false);
        }
    }

    #[test]
    fn cached_values_are_served() {
        let cache = Cache::in_memory().unwrap();
        cache.set(cache::KEY_TOP_CHARTS, r#"[{"id":"1","title":"T","url":""}]"#).unwrap();
        cache.set(cache::KEY_LAST_SCRAPED, "2024-01-01T00:00:00.000Z").unwrap();

        let charts = respond(&cache, "/api/jiosaavn/top-charts/");
        assert_eq!(charts.status, 200);
        assert_eq!(charts.body["data"][0]["title"], "T");

        let ts = respond(&cache, "/api/jiosaavn/last-scraped?x=1");
        assert_eq!(ts.body["data"]["lastScraped"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn corrupt_value_is_server_error() {
        let cache = Cache::in_memory().unwrap();
        cache.set(cache::KEY_TOP_ARTISTS, "{not json").unwrap();
        let res = respond(&cache, "/api/jiosaavn/top-artists");
        assert_eq!(res.status, 500);
        assert_eq!(res.body["message"], "Failed to fetch top artists");
    }

    #[test]
    fn unknown_path_is_not_found() {
        let cache = Cache::in_memory().unwrap();
        let res = respond(&cache, "/api/other");
        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Cannot find /api/other on this server");
        assert_eq!(respond(&cache, "/api/jiosaavn/nope").status, 404);
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        let cache = Arc::new(Cache::in_memory().unwrap());
        cache.set(cache::KEY_NEW_RELEASES, "[]").unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::clone(&cache)));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /api/jiosaavn/new-releases HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let json: Value = serde_json::from_str(body).unwrap();
        assert_eq!(json, json!({ "success": true, "data": [] }));
    }

    #[tokio::test]
    async fn rejects_non_get() {
        let cache = Arc::new(Cache::in_memory().unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, cache));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"POST / HTTP/1.1\r\n\r\n").await.unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 405 Method Not Allowed"));
    }
}
