//! Compile-time registry of book-data provider configurations.
//!
//! Each provider is defined in a TOML file under `providers/`. The
//! registry embeds these at compile time and exposes them via
//! [`all_providers`] and [`enabled_providers`].
//!
//! Base URLs always point at the proxy prefix for a provider, never at
//! the third-party host itself; the same goes for `cover_proxy_url`,
//! which fronts the provider's image-asset host. Tests swap these for
//! mock-server URLs by constructing [`BookProvider`] values directly.

use serde::Deserialize;

/// A book-data provider configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct BookProvider {
    /// Unique identifier (e.g., `"goodreads"`, `"google_books"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this provider is active in the resolution pipeline.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Execution order — lower values run first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Goodreads book-page scrape.
    Goodreads {
        /// Proxy prefix fronting the Goodreads site.
        base_url: String,
        /// Proxy prefix fronting the Goodreads image host.
        cover_proxy_url: String,
    },
    /// Google Books REST catalog.
    GoogleBooks {
        /// Proxy prefix fronting the Google Books API.
        base_url: String,
        /// Proxy prefix fronting the Google Books cover host.
        cover_proxy_url: String,
    },
    /// Hardcover GraphQL catalog.
    Hardcover {
        /// Proxy prefix fronting the Hardcover API.
        base_url: String,
        /// Proxy prefix fronting the Hardcover asset host.
        cover_proxy_url: String,
    },
}

const fn default_true() -> bool {
    true
}

impl BookProvider {
    /// Returns the provider's catalog base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Goodreads { base_url, .. }
            | ProviderConfig::GoogleBooks { base_url, .. }
            | ProviderConfig::Hardcover { base_url, .. } => base_url,
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const PROVIDER_TOMLS: &[(&str, &str)] = &[
    ("goodreads", include_str!("../providers/goodreads.toml")),
    ("google_books", include_str!("../providers/google_books.toml")),
    ("hardcover", include_str!("../providers/hardcover.toml")),
];

#[cfg(test)]
const EXPECTED_PROVIDER_COUNT: usize = 3;

/// Returns all provider configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time
/// guarantee since the configs are embedded).
#[must_use]
pub fn all_providers() -> Vec<BookProvider> {
    PROVIDER_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse book provider '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled providers, sorted by priority (ascending).
#[must_use]
pub fn enabled_providers() -> Vec<BookProvider> {
    let mut providers: Vec<BookProvider> =
        all_providers().into_iter().filter(|p| p.enabled).collect();
    providers.sort_by_key(|p| p.priority);
    providers
}
