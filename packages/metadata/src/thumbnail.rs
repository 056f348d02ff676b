//! Best-effort cover-image fetching.
//!
//! A missing cover must never abort book resolution, so every failure
//! here — non-2xx status, network error, timeout — is logged and
//! reported as "no image". Callers rewrite image URLs through
//! [`rewrite_origin`] before fetching; no request may target the
//! third-party image host directly.

/// Fetches cover-image bytes from `url`.
///
/// Returns `None` on any failure; errors never propagate past this
/// boundary.
pub async fn fetch_thumbnail(client: &reqwest::Client, url: &str) -> Option<Vec<u8>> {
    log::debug!("Fetching thumbnail from {url}");

    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => match resp.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                log::warn!("Failed to read thumbnail body from {url}: {e}");
                None
            }
        },
        Ok(resp) => {
            log::warn!("Failed to fetch thumbnail. Status: {}", resp.status());
            None
        }
        Err(e) => {
            log::error!("Error fetching thumbnail from {url}: {e}");
            None
        }
    }
}

/// Replaces the scheme-and-host origin of `url` with `proxy_base`,
/// keeping the path and query intact.
///
/// `proxy_base` is expected without a trailing slash. A `url` that is
/// already origin-less (a bare path) is appended to `proxy_base` as-is.
#[must_use]
pub fn rewrite_origin(url: &str, proxy_base: &str) -> String {
    let path = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest.find('/').map_or("", |i| &rest[i..]));
    format!("{proxy_base}{path}")
}
