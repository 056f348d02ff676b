//! Priority-ordered resolution across all configured providers.
//!
//! The pipeline is strictly sequential: a lower-priority provider is
//! consulted only while the working record is still incomplete, so a
//! complete hit on the first source costs exactly one provider call.
//! Every provider failure is absorbed as "no data"; resolution fails
//! only when no provider returns anything at all.

use std::time::Duration;

use crate::registry::{self, BookProvider, ProviderConfig};
use crate::{BookRecord, MetadataError, PartialBook, goodreads, google_books, hardcover};

/// Per-request timeout applied at the transport boundary.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API credentials for providers that require them.
///
/// Both are optional: a missing credential degrades that provider to
/// "no data" at the source rather than failing resolution.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Google Books API key (`key` query parameter).
    pub google_api_key: Option<String>,
    /// Hardcover API bearer token.
    pub hardcover_token: Option<String>,
}

impl Credentials {
    /// Reads credentials from `GOOGLE_BOOKS_API_KEY` and
    /// `HARDCOVER_API_TOKEN`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            google_api_key: std::env::var("GOOGLE_BOOKS_API_KEY").ok(),
            hardcover_token: std::env::var("HARDCOVER_API_TOKEN").ok(),
        }
    }
}

/// Resolves ISBNs to [`BookRecord`]s by consulting providers in
/// priority order and merging their partial answers.
///
/// Each [`resolve`](Self::resolve) call is independent and reentrant;
/// all working state is local to the call.
#[derive(Debug)]
pub struct BookResolver {
    client: reqwest::Client,
    providers: Vec<BookProvider>,
    credentials: Credentials,
}

impl BookResolver {
    /// Creates a resolver over an explicit provider list, assumed to be
    /// priority-sorted.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn new(providers: Vec<BookProvider>, credentials: Credentials) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            providers,
            credentials,
        })
    }

    /// Creates a resolver over the enabled providers from the embedded
    /// [`registry`].
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn from_registry(credentials: Credentials) -> Result<Self, MetadataError> {
        Self::new(registry::enabled_providers(), credentials)
    }

    /// Resolves an ISBN-13 to a book record.
    ///
    /// The returned record may still have unresolved (sentinel) fields;
    /// partial data is acceptable, total failure is not.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::NotFound`] when every provider came
    /// back empty.
    pub async fn resolve(&self, isbn: &str) -> Result<BookRecord, MetadataError> {
        let mut working = PartialBook::default();
        let mut any_data = false;

        for provider in &self.providers {
            if !working.is_incomplete() {
                break;
            }
            log::debug!("Consulting provider '{}' for ISBN {isbn}", provider.id);
            if let Some(book) = self.consult(provider, isbn, &working).await {
                any_data = true;
                working = working.fill_from(book);
            }
        }

        if any_data {
            Ok(working.into_record())
        } else {
            Err(MetadataError::NotFound {
                isbn: isbn.to_owned(),
            })
        }
    }

    /// Dispatches one provider. `working` is consulted only for the
    /// Hardcover title fallback.
    async fn consult(
        &self,
        provider: &BookProvider,
        isbn: &str,
        working: &PartialBook,
    ) -> Option<PartialBook> {
        match &provider.provider {
            ProviderConfig::Goodreads {
                base_url,
                cover_proxy_url,
            } => goodreads::fetch_book(&self.client, base_url, cover_proxy_url, isbn).await,
            ProviderConfig::GoogleBooks {
                base_url,
                cover_proxy_url,
            } => {
                google_books::fetch_book(
                    &self.client,
                    base_url,
                    cover_proxy_url,
                    self.credentials.google_api_key.as_deref(),
                    isbn,
                )
                .await
            }
            ProviderConfig::Hardcover {
                base_url,
                cover_proxy_url,
            } => {
                let token = self.credentials.hardcover_token.as_deref();
                let by_isbn = hardcover::fetch_book(
                    &self.client,
                    base_url,
                    cover_proxy_url,
                    token,
                    Some(isbn),
                    None,
                )
                .await;
                if by_isbn.is_some() {
                    return by_isbn;
                }

                // Retry by title when an earlier source resolved one.
                // `working` holds options, so an unresolved title can
                // never leak a sentinel into the query.
                let title = working.title.as_deref().filter(|t| !t.is_empty())?;
                log::info!("Hardcover ISBN query found nothing. Trying by title.");
                hardcover::fetch_book(&self.client, base_url, cover_proxy_url, token, None, Some(title))
                    .await
            }
        }
    }
}
