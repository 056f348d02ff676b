//! Goodreads book-page scrape adapter.
//!
//! Goodreads has no public API; its book pages embed the server-rendered
//! Apollo GraphQL cache in a `<script id="__NEXT_DATA__">` JSON blob.
//! This adapter fetches `{base_url}/book/isbn/{isbn}` (the proxy follows
//! the redirect to the canonical book page), extracts that blob, and
//! walks the flat apollo-state table:
//!
//! - `Contributor:*` entries form an id → display-name side table;
//! - the `Book:*` entry whose `details.isbn13` matches the query is the
//!   record of interest; author names are resolved by following its
//!   primary and secondary contributor edges (role `"Author"` only)
//!   through the side table.
//!
//! A page that cannot be fetched or parsed yields nothing; Goodreads is
//! allowed to simply not have the book.

use std::collections::BTreeMap;

use chrono::{Datelike, TimeZone, Utc};
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::{MetadataError, PartialBook, thumbnail};

/// A `Book:*` entry from the apollo-state table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApolloBook {
    title: Option<String>,
    image_url: Option<String>,
    details: Option<BookDetails>,
    primary_contributor_edge: Option<ContributorEdge>,
    #[serde(default)]
    secondary_contributor_edges: Vec<ContributorEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDetails {
    isbn13: Option<String>,
    publisher: Option<String>,
    /// Publication timestamp in epoch milliseconds.
    publication_time: Option<f64>,
    language: Option<LanguageName>,
    num_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LanguageName {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContributorEdge {
    node: Option<ContributorRef>,
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContributorRef {
    #[serde(rename = "__ref")]
    reference: Option<String>,
}

/// The book entry matched for an ISBN, plus the contributor side table
/// needed to resolve its author edges.
#[derive(Debug)]
struct BookMatch {
    book: ApolloBook,
    contributors: BTreeMap<String, String>,
}

/// Fetches book details from Goodreads for an ISBN-13.
///
/// Returns `None` both when Goodreads does not have the book and on any
/// fetch or parse failure; errors never propagate past this adapter.
pub async fn fetch_book(
    client: &reqwest::Client,
    base_url: &str,
    cover_proxy_url: &str,
    isbn13: &str,
) -> Option<PartialBook> {
    match fetch_book_inner(client, base_url, cover_proxy_url, isbn13).await {
        Ok(book) => book,
        Err(e) => {
            log::error!("Error fetching Goodreads details for ISBN {isbn13}: {e}");
            None
        }
    }
}

async fn fetch_book_inner(
    client: &reqwest::Client,
    base_url: &str,
    cover_proxy_url: &str,
    isbn13: &str,
) -> Result<Option<PartialBook>, MetadataError> {
    let url = format!("{base_url}/book/isbn/{isbn13}");
    log::info!("Fetching Goodreads details for ISBN: {isbn13}");

    let resp = client.get(&url).send().await?;
    if !resp.status().is_success() {
        log::warn!("Failed to fetch Goodreads page. Status: {}", resp.status());
        return Ok(None);
    }

    let html = resp.text().await?;
    let Some(matched) = parse_book_page(&html, isbn13)? else {
        return Ok(None);
    };

    let mut book = map_book(&matched);
    if let Some(image_url) = &matched.book.image_url {
        let proxied = thumbnail::rewrite_origin(image_url, cover_proxy_url);
        book.thumbnail = thumbnail::fetch_thumbnail(client, &proxied).await;
    }

    Ok(Some(book))
}

/// Extracts the apollo-state blob from a Goodreads book page and locates
/// the book entry matching `isbn13`.
///
/// Returns `Ok(None)` when the page has no `__NEXT_DATA__` script, no
/// apollo state, or no book entry for the ISBN.
fn parse_book_page(html: &str, isbn13: &str) -> Result<Option<BookMatch>, MetadataError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__")
        .map_err(|e| MetadataError::Parse(format!("invalid selector: {e}")))?;

    let Some(script) = document.select(&selector).next() else {
        log::warn!("No __NEXT_DATA__ script found in the page");
        return Ok(None);
    };

    let blob: String = script.text().collect();
    let next_data: serde_json::Value = serde_json::from_str(&blob)
        .map_err(|e| MetadataError::Parse(format!("invalid __NEXT_DATA__ JSON: {e}")))?;

    let Some(apollo_state) = next_data["props"]["pageProps"]["apolloState"].as_object() else {
        log::warn!("No apolloState found in __NEXT_DATA__");
        return Ok(None);
    };

    let mut contributors = BTreeMap::new();
    for (key, value) in apollo_state {
        if key.starts_with("Contributor:")
            && let (Some(id), Some(name)) = (value["id"].as_str(), value["name"].as_str())
        {
            contributors.insert(id.to_owned(), name.to_owned());
        }
    }

    let book = apollo_state.iter().find_map(|(key, value)| {
        if !key.starts_with("Book:") {
            return None;
        }
        let book: ApolloBook = serde_json::from_value(value.clone()).ok()?;
        let matches = book
            .details
            .as_ref()
            .and_then(|d| d.isbn13.as_deref())
            .is_some_and(|i| i == isbn13);
        matches.then_some(book)
    });

    let Some(book) = book else {
        log::warn!("No matching Book entry found for ISBN: {isbn13}");
        return Ok(None);
    };

    Ok(Some(BookMatch { book, contributors }))
}

/// Total mapping from a matched apollo book entry to the partial record.
/// The thumbnail is fetched separately by the caller.
fn map_book(matched: &BookMatch) -> PartialBook {
    let details = matched.book.details.as_ref();
    PartialBook {
        title: matched.book.title.clone().filter(|t| !t.is_empty()),
        authors: collect_authors(matched),
        publisher: details
            .and_then(|d| d.publisher.clone())
            .filter(|p| !p.is_empty()),
        published_date: details
            .and_then(|d| d.publication_time)
            .and_then(publication_year),
        language: details
            .and_then(|d| d.language.as_ref())
            .and_then(|l| l.name.clone()),
        page_count: details.and_then(|d| d.num_pages).filter(|&n| n > 0),
        thumbnail: None,
    }
}

/// Resolves author display names by walking the primary and secondary
/// contributor edges and looking each `Contributor:` ref up in the side
/// table. Edges with any role other than `"Author"` are skipped.
fn collect_authors(matched: &BookMatch) -> Option<String> {
    let edges = matched
        .book
        .primary_contributor_edge
        .iter()
        .chain(&matched.book.secondary_contributor_edges);

    let mut authors = Vec::new();
    for edge in edges {
        if edge.role.as_deref() != Some("Author") {
            continue;
        }
        let id = edge
            .node
            .as_ref()
            .and_then(|n| n.reference.as_deref())
            .and_then(|r| r.strip_prefix("Contributor:"));
        if let Some(name) = id.and_then(|id| matched.contributors.get(id)) {
            authors.push(name.clone());
        }
    }

    if authors.is_empty() {
        None
    } else {
        Some(authors.join(", "))
    }
}

/// Extracts the four-digit year from an epoch-milliseconds timestamp.
#[allow(clippy::cast_possible_truncation)]
fn publication_year(epoch_millis: f64) -> Option<String> {
    Utc.timestamp_millis_opt(epoch_millis as i64)
        .single()
        .map(|dt| dt.year().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_page(apollo_state: serde_json::Value) -> String {
        let next_data = serde_json::json!({
            "props": { "pageProps": { "apolloState": apollo_state } }
        });
        format!(
            "<html><body>\
             <script id=\"__NEXT_DATA__\" type=\"application/json\">{next_data}</script>\
             </body></html>"
        )
    }

    fn dune_state() -> serde_json::Value {
        serde_json::json!({
            "Contributor:kca://author/1": { "id": "kca://author/1", "name": "Frank Herbert" },
            "Contributor:kca://author/2": { "id": "kca://author/2", "name": "Brian Herbert" },
            "Contributor:kca://author/3": { "id": "kca://author/3", "name": "John Schoenherr" },
            "Book:kca://book/9": {
                "title": "Dune",
                "imageUrl": "https://images-na.ssl-images-amazon.com/images/dune.jpg",
                "details": {
                    "isbn13": "9780441172719",
                    "publisher": "Ace Books",
                    // 1990-09-01 in epoch millis
                    "publicationTime": 652_147_200_000_i64,
                    "language": { "name": "English" },
                    "numPages": 412
                },
                "primaryContributorEdge": {
                    "node": { "__ref": "Contributor:kca://author/1" },
                    "role": "Author"
                },
                "secondaryContributorEdges": [
                    {
                        "node": { "__ref": "Contributor:kca://author/2" },
                        "role": "Author"
                    },
                    {
                        "node": { "__ref": "Contributor:kca://author/3" },
                        "role": "Illustrator"
                    }
                ]
            }
        })
    }

    #[test]
    fn parses_and_maps_matching_book() {
        let html = book_page(dune_state());
        let matched = parse_book_page(&html, "9780441172719").unwrap().unwrap();
        let book = map_book(&matched);

        assert_eq!(book.title.as_deref(), Some("Dune"));
        assert_eq!(book.authors.as_deref(), Some("Frank Herbert, Brian Herbert"));
        assert_eq!(book.publisher.as_deref(), Some("Ace Books"));
        assert_eq!(book.published_date.as_deref(), Some("1990"));
        assert_eq!(book.language.as_deref(), Some("English"));
        assert_eq!(book.page_count, Some(412));
        assert_eq!(book.thumbnail, None);
        assert_eq!(
            matched.book.image_url.as_deref(),
            Some("https://images-na.ssl-images-amazon.com/images/dune.jpg")
        );
    }

    #[test]
    fn non_author_roles_are_excluded() {
        let html = book_page(dune_state());
        let matched = parse_book_page(&html, "9780441172719").unwrap().unwrap();
        let authors = collect_authors(&matched).unwrap();
        assert!(!authors.contains("John Schoenherr"));
    }

    #[test]
    fn isbn_mismatch_yields_no_data() {
        let html = book_page(dune_state());
        assert!(parse_book_page(&html, "9780000000000").unwrap().is_none());
    }

    #[test]
    fn page_without_next_data_yields_no_data() {
        let html = "<html><body><p>rate limited</p></body></html>";
        assert!(parse_book_page(html, "9780441172719").unwrap().is_none());
    }

    #[test]
    fn malformed_next_data_is_an_error() {
        let html = "<html><script id=\"__NEXT_DATA__\" type=\"application/json\">\
                    {not json</script></html>";
        assert!(parse_book_page(html, "9780441172719").is_err());
    }

    #[test]
    fn missing_optional_fields_map_to_unresolved() {
        let state = serde_json::json!({
            "Book:kca://book/1": {
                "title": "Bare",
                "details": { "isbn13": "9780441172719", "numPages": 0 }
            }
        });
        let html = book_page(state);
        let matched = parse_book_page(&html, "9780441172719").unwrap().unwrap();
        let book = map_book(&matched);

        assert_eq!(book.title.as_deref(), Some("Bare"));
        assert_eq!(book.authors, None);
        assert_eq!(book.publisher, None);
        assert_eq!(book.published_date, None);
        assert_eq!(book.language, None);
        // A reported zero is indistinguishable from "not reported".
        assert_eq!(book.page_count, None);
    }
}
