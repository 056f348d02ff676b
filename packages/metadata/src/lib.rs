#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Book-metadata resolution for the bookshelf library tracker.
//!
//! Given an ISBN-13, consults multiple external book-data sources in
//! priority order and merges their partial answers into one record:
//!
//! 1. **Goodreads** (priority 1) — HTML page scrape, richest author data.
//! 2. **Google Books** (priority 2) — REST catalog, two-step search +
//!    detail fetch.
//! 3. **Hardcover** (priority 3) — GraphQL catalog, bearer-token
//!    authenticated, with a title-keyed fallback query.
//!
//! Providers are loaded from the [`registry`] and executed in priority
//! order by the [`resolver::BookResolver`]. A provider that cannot supply
//! the book simply yields nothing and the pipeline moves on; resolution
//! fails only when every provider comes back empty.
//!
//! All outbound requests target allow-listed proxy prefixes rather than
//! the third-party hosts directly. The proxies handle CORS, redirect
//! relaying, and browser-like headers; this crate never needs to know.

pub mod goodreads;
pub mod google_books;
pub mod hardcover;
pub mod registry;
pub mod resolver;
pub mod thumbnail;

use thiserror::Error;

/// Sentinel value for unresolved string fields in a [`BookRecord`].
pub const UNKNOWN: &str = "Unknown";

/// The canonical book-metadata record handed to callers.
///
/// String fields that no source could resolve hold [`UNKNOWN`];
/// an unresolved page count is `0`; a missing cover is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Book title.
    pub title: String,
    /// Author display names, comma-joined.
    pub authors: String,
    /// Publisher name.
    pub publisher: String,
    /// Four-digit publication year.
    pub published_date: String,
    /// Language code or display name, as the source reported it.
    pub language: String,
    /// Number of pages.
    pub page_count: u32,
    /// Cover image bytes, if any source could supply one.
    pub thumbnail: Option<Vec<u8>>,
}

/// A partially resolved record as built up during one resolution call.
///
/// Every field is optional so that "unresolved" is explicit rather than
/// encoded in sentinel values; sentinels are applied only at the final
/// [`PartialBook::into_record`] boundary. Sources that report a page
/// count of zero map it to `None` here, matching the observed behavior
/// of treating "zero pages" and "not reported" identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialBook {
    /// Book title.
    pub title: Option<String>,
    /// Author display names, comma-joined.
    pub authors: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Four-digit publication year.
    pub published_date: Option<String>,
    /// Language code or display name.
    pub language: Option<String>,
    /// Number of pages.
    pub page_count: Option<u32>,
    /// Cover image bytes.
    pub thumbnail: Option<Vec<u8>>,
}

impl PartialBook {
    /// Fill-only merge: takes `other`'s value for every field that is
    /// still unresolved in `self`, and never overwrites a resolved one.
    #[must_use]
    pub fn fill_from(self, other: Self) -> Self {
        Self {
            title: self.title.or(other.title),
            authors: self.authors.or(other.authors),
            publisher: self.publisher.or(other.publisher),
            published_date: self.published_date.or(other.published_date),
            language: self.language.or(other.language),
            page_count: self.page_count.or(other.page_count),
            thumbnail: self.thumbnail.or(other.thumbnail),
        }
    }

    /// Whether a lower-priority source should still be consulted.
    ///
    /// Published date and language are deliberately excluded from the
    /// gate: they are enrichments, not blockers, and a record missing
    /// only those is considered complete.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool {
        self.title.is_none()
            || self.authors.is_none()
            || self.publisher.is_none()
            || self.page_count.is_none()
            || self.thumbnail.is_none()
    }

    /// Converts to the caller-facing record, substituting sentinels for
    /// every still-unresolved field.
    #[must_use]
    pub fn into_record(self) -> BookRecord {
        BookRecord {
            title: self.title.unwrap_or_else(|| UNKNOWN.to_owned()),
            authors: self.authors.unwrap_or_else(|| UNKNOWN.to_owned()),
            publisher: self.publisher.unwrap_or_else(|| UNKNOWN.to_owned()),
            published_date: self.published_date.unwrap_or_else(|| UNKNOWN.to_owned()),
            language: self.language.unwrap_or_else(|| UNKNOWN.to_owned()),
            page_count: self.page_count.unwrap_or(0),
            thumbnail: self.thumbnail,
        }
    }
}

/// Errors from metadata resolution.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Parsing a source response failed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Every provider came back empty for the requested ISBN.
    #[error("no source could resolve ISBN {isbn}")]
    NotFound {
        /// The ISBN-13 that could not be resolved.
        isbn: String,
    },
}
