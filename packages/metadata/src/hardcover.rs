//! Hardcover GraphQL catalog adapter.
//!
//! Queries the `editions` collection either by exact ISBN-13 or by exact
//! title (the title variant backs the resolver's fallback when an
//! ISBN-keyed lookup finds nothing). Requests are bearer-token
//! authenticated and POSTed through the Hardcover proxy prefix.

use serde::Deserialize;

use crate::{MetadataError, PartialBook, thumbnail};

const EDITIONS_BY_ISBN_QUERY: &str = "\
query GetBookInfoFromISBN($isbn: String!) {
  editions(where: {isbn_13: {_eq: $isbn}}) {
    id
    title
    edition_format
    pages
    release_date
    isbn_10
    isbn_13
    publisher {
      name
    }
    image {
      url
    }
    contributions {
      author {
        name
      }
    }
    language {
      code2
    }
  }
}";

const EDITIONS_BY_TITLE_QUERY: &str = "\
query GetEditionsFromTitle($title: String!) {
  editions(where: {title: {_eq: $title}}) {
    id
    title
    edition_format
    pages
    release_date
    isbn_10
    isbn_13
    publisher {
      name
    }
    image {
      url
    }
    contributions {
      author {
        name
      }
    }
    language {
      code2
    }
  }
}";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<EditionsData>,
}

#[derive(Debug, Deserialize)]
struct EditionsData {
    #[serde(default)]
    editions: Vec<Edition>,
}

/// One edition from the Hardcover `editions` collection.
#[derive(Debug, Deserialize)]
struct Edition {
    title: Option<String>,
    pages: Option<u32>,
    release_date: Option<String>,
    publisher: Option<Publisher>,
    image: Option<EditionImage>,
    contributions: Option<Vec<Contribution>>,
    language: Option<EditionLanguage>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditionImage {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Contribution {
    author: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditionLanguage {
    code2: Option<String>,
}

/// Fetches book details from the Hardcover API by ISBN-13 or by exact
/// title. Exactly one of `isbn` / `title` is expected; when the caller
/// supplies neither, that contract violation is logged and treated as
/// "no data" so the pipeline can keep trying other sources.
///
/// Returns `None` when no edition matches and on any fetch or parse
/// failure; errors never propagate past this adapter.
pub async fn fetch_book(
    client: &reqwest::Client,
    base_url: &str,
    cover_proxy_url: &str,
    token: Option<&str>,
    isbn: Option<&str>,
    title: Option<&str>,
) -> Option<PartialBook> {
    let (query, variables) = match (isbn, title) {
        (Some(isbn), _) => (EDITIONS_BY_ISBN_QUERY, serde_json::json!({ "isbn": isbn })),
        (None, Some(title)) => (
            EDITIONS_BY_TITLE_QUERY,
            serde_json::json!({ "title": title }),
        ),
        (None, None) => {
            log::error!("Invalid parameters for Hardcover API query");
            return None;
        }
    };

    match fetch_book_inner(client, base_url, cover_proxy_url, token, query, &variables).await {
        Ok(book) => book,
        Err(e) => {
            log::error!("Error fetching data from Hardcover API: {e}");
            None
        }
    }
}

async fn fetch_book_inner(
    client: &reqwest::Client,
    base_url: &str,
    cover_proxy_url: &str,
    token: Option<&str>,
    query: &str,
    variables: &serde_json::Value,
) -> Result<Option<PartialBook>, MetadataError> {
    let url = format!("{base_url}/v1/graphql");
    log::info!("Querying Hardcover API with variables: {variables}");

    let mut request = client
        .post(&url)
        .json(&serde_json::json!({ "query": query, "variables": variables }));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let resp = request.send().await?;
    if !resp.status().is_success() {
        log::warn!("Hardcover API returned status: {}", resp.status());
        return Ok(None);
    }

    let response: GraphQlResponse = resp.json().await?;
    let Some(edition) = first_edition(&response) else {
        log::info!("No results found for {variables} in Hardcover API");
        return Ok(None);
    };

    let mut book = map_edition(edition);
    if let Some(image_url) = edition.image.as_ref().and_then(|i| i.url.as_deref()) {
        let proxied = thumbnail::rewrite_origin(image_url, cover_proxy_url);
        book.thumbnail = thumbnail::fetch_thumbnail(client, &proxied).await;
    }

    Ok(Some(book))
}

/// Returns the first edition in the result set, if any.
fn first_edition(response: &GraphQlResponse) -> Option<&Edition> {
    response.data.as_ref()?.editions.first()
}

/// Total mapping from a Hardcover edition to the partial record.
/// The thumbnail is fetched separately by the caller.
fn map_edition(edition: &Edition) -> PartialBook {
    let authors: Vec<&str> = edition
        .contributions
        .iter()
        .flatten()
        .filter_map(|c| c.author.as_ref()?.name.as_deref())
        .filter(|name| !name.is_empty())
        .collect();

    PartialBook {
        title: edition.title.clone().filter(|t| !t.is_empty()),
        authors: if authors.is_empty() {
            None
        } else {
            Some(authors.join(", "))
        },
        publisher: edition
            .publisher
            .as_ref()
            .and_then(|p| p.name.clone())
            .filter(|n| !n.is_empty()),
        published_date: edition
            .release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
            .map(ToOwned::to_owned),
        language: edition
            .language
            .as_ref()
            .and_then(|l| l.code2.as_deref())
            .map(str::to_uppercase)
            .filter(|l| !l.is_empty()),
        page_count: edition.pages.filter(|&n| n > 0),
        thumbnail: None,
    }
}
