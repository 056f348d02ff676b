//! Google Books REST catalog adapter.
//!
//! Lookup is two-step by design: the `volumes?q=isbn:` search returns
//! abbreviated stubs, so the adapter follows the first stub's `selfLink`
//! (origin rewritten onto the proxy prefix) to get the full volume
//! record before mapping.

use serde::Deserialize;

use crate::{MetadataError, PartialBook, thumbnail};

#[derive(Debug, Deserialize)]
struct VolumeList {
    items: Option<Vec<VolumeStub>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeStub {
    self_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

/// The detail payload of one volume, as returned by the `selfLink`
/// resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    language: Option<String>,
    page_count: Option<u32>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

/// Fetches book details from the Google Books API for an ISBN.
///
/// Returns `None` when the catalog has no match and on any fetch or
/// parse failure; errors never propagate past this adapter.
pub async fn fetch_book(
    client: &reqwest::Client,
    base_url: &str,
    cover_proxy_url: &str,
    api_key: Option<&str>,
    isbn: &str,
) -> Option<PartialBook> {
    match fetch_book_inner(client, base_url, cover_proxy_url, api_key, isbn).await {
        Ok(book) => book,
        Err(e) => {
            log::error!("Error fetching data from Google Books API for ISBN {isbn}: {e}");
            None
        }
    }
}

async fn fetch_book_inner(
    client: &reqwest::Client,
    base_url: &str,
    cover_proxy_url: &str,
    api_key: Option<&str>,
    isbn: &str,
) -> Result<Option<PartialBook>, MetadataError> {
    let url = format!("{base_url}/books/v1/volumes");
    log::info!("Fetching book details from Google Books API for ISBN: {isbn}");

    let mut request = client.get(&url).query(&[("q", format!("isbn:{isbn}"))]);
    if let Some(key) = api_key {
        request = request.query(&[("key", key)]);
    }

    let resp = request.send().await?;
    if !resp.status().is_success() {
        log::warn!("Google Books API returned status: {}", resp.status());
        return Ok(None);
    }

    let list: VolumeList = resp.json().await?;
    let Some(self_link) = first_self_link(&list) else {
        log::info!("No book found for ISBN: {isbn}");
        return Ok(None);
    };

    // The search stub is deliberately incomplete; the full record lives
    // behind the selfLink, which points at the origin API.
    let details_url = thumbnail::rewrite_origin(self_link, base_url);
    let details_resp = client.get(&details_url).send().await?;
    if !details_resp.status().is_success() {
        log::warn!(
            "Failed to fetch details from URL. Status: {}",
            details_resp.status()
        );
        return Ok(None);
    }

    let volume: Volume = details_resp.json().await?;
    let Some(info) = volume.volume_info else {
        log::info!("No volume info found for ISBN: {isbn}");
        return Ok(None);
    };

    let mut book = map_volume(&info);
    if let Some(thumbnail_url) = info.image_links.as_ref().and_then(|l| l.thumbnail.as_deref()) {
        let proxied = thumbnail::rewrite_origin(thumbnail_url, cover_proxy_url);
        book.thumbnail = thumbnail::fetch_thumbnail(client, &proxied).await;
    }

    Ok(Some(book))
}

/// Returns the first search result's `selfLink`, if any.
fn first_self_link(list: &VolumeList) -> Option<&str> {
    list.items.as_ref()?.first()?.self_link.as_deref()
}

/// Total mapping from a volume detail payload to the partial record.
/// The thumbnail is fetched separately by the caller.
fn map_volume(info: &VolumeInfo) -> PartialBook {
    PartialBook {
        title: info.title.clone().filter(|t| !t.is_empty()),
        authors: info
            .authors
            .as_ref()
            .map(|a| a.join(", "))
            .filter(|a| !a.is_empty()),
        publisher: info.publisher.clone().filter(|p| !p.is_empty()),
        published_date: info
            .published_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
            .map(ToOwned::to_owned),
        language: info
            .language
            .as_deref()
            .map(str::to_uppercase)
            .filter(|l| !l.is_empty()),
        page_count: info.page_count.filter(|&n| n > 0),
        thumbnail: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_search_result_self_link() {
        let list: VolumeList = serde_json::from_value(serde_json::json!({
            "items": [
                { "selfLink": "https://www.googleapis.com/books/v1/volumes/abc" },
                { "selfLink": "https://www.googleapis.com/books/v1/volumes/def" }
            ]
        }))
        .unwrap();
        assert_eq!(
            first_self_link(&list),
            Some("https://www.googleapis.com/books/v1/volumes/abc")
        );
    }

    #[test]
    fn empty_search_result_has_no_self_link() {
        let list: VolumeList = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(first_self_link(&list), None);

        let list: VolumeList = serde_json::from_value(serde_json::json!({ "items": [] })).unwrap();
        assert_eq!(first_self_link(&list), None);
    }

    #[test]
    fn maps_full_volume_info() {
        let info: VolumeInfo = serde_json::from_value(serde_json::json!({
            "title": "The Left Hand of Darkness",
            "authors": ["Ursula K. Le Guin"],
            "publisher": "Ace Books",
            "publishedDate": "1969-03-01",
            "language": "en",
            "pageCount": 304,
            "imageLinks": {
                "thumbnail": "http://books.google.com/books/content?id=x"
            }
        }))
        .unwrap();

        let book = map_volume(&info);
        assert_eq!(book.title.as_deref(), Some("The Left Hand of Darkness"));
        assert_eq!(book.authors.as_deref(), Some("Ursula K. Le Guin"));
        assert_eq!(book.publisher.as_deref(), Some("Ace Books"));
        assert_eq!(book.published_date.as_deref(), Some("1969"));
        assert_eq!(book.language.as_deref(), Some("EN"));
        assert_eq!(book.page_count, Some(304));
    }

    #[test]
    fn joins_multiple_authors() {
        let info: VolumeInfo = serde_json::from_value(serde_json::json!({
            "authors": ["Terry Pratchett", "Neil Gaiman"]
        }))
        .unwrap();
        assert_eq!(
            map_volume(&info).authors.as_deref(),
            Some("Terry Pratchett, Neil Gaiman")
        );
    }

    #[test]
    fn missing_fields_map_to_unresolved() {
        let info: VolumeInfo = serde_json::from_value(serde_json::json!({})).unwrap();
        let book = map_volume(&info);
        assert_eq!(book, PartialBook::default());
    }

    #[test]
    fn zero_page_count_maps_to_unresolved() {
        let info: VolumeInfo =
            serde_json::from_value(serde_json::json!({ "pageCount": 0 })).unwrap();
        assert_eq!(map_volume(&info).page_count, None);
    }

    #[test]
    fn year_is_first_segment_of_hyphenated_date() {
        let info: VolumeInfo =
            serde_json::from_value(serde_json::json!({ "publishedDate": "2006-10-31" })).unwrap();
        assert_eq!(map_volume(&info).published_date.as_deref(), Some("2006"));

        let info: VolumeInfo =
            serde_json::from_value(serde_json::json!({ "publishedDate": "1998" })).unwrap();
        assert_eq!(map_volume(&info).published_date.as_deref(), Some("1998"));
    }
}
