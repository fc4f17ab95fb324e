//! Asset retrieval and parsing
//!
//! Grammar and theme assets live at fixed site-relative paths. The
//! [`AssetSource`] seam abstracts where the bytes come from: production uses
//! [`HttpAssetSource`] against the documentation site, and the crate ships
//! the same assets compiled in through [`EmbeddedAssetSource`] so rendering
//! also works without a network.
//!
//! Sources only fetch; caching is the pipeline's job. A failed fetch is
//! never retried.

use crate::config;
use crate::error::HighlightError;
use crate::grammar::{Grammar, GrammarData};
use crate::theme::{Theme, ThemeData};

/// Embedded copies of the site assets.
pub const VERSE_GRAMMAR_JSON: &str = include_str!("../assets/verse.grammar.json");
pub const VERSE_DARK_JSON: &str = include_str!("../assets/verse-dark.json");
pub const VERSE_LIGHT_JSON: &str = include_str!("../assets/verse-light.json");

/// Where asset bytes come from.
///
/// `Send + Sync` so the grammar and theme fetches of one pipeline run can
/// execute concurrently on scoped threads.
pub trait AssetSource: Send + Sync {
    /// Retrieve the raw bytes of the asset at a site-relative path.
    fn fetch(&self, path: &str) -> Result<Vec<u8>, HighlightError>;
}

/// Fetches assets over HTTP from the documentation site.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    base_url: String,
}

impl HttpAssetSource {
    /// Create a source rooted at a base URL, e.g. `https://docs.example.com`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl AssetSource for HttpAssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, HighlightError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "fetching asset");
        let mut response = ureq::get(url.as_str())
            .call()
            .map_err(|e| HighlightError::Fetch {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| HighlightError::Fetch {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Serves the compiled-in assets at the same paths the site uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssetSource;

impl AssetSource for EmbeddedAssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, HighlightError> {
        let body = match path {
            config::GRAMMAR_PATH => VERSE_GRAMMAR_JSON,
            config::DARK_THEME_PATH => VERSE_DARK_JSON,
            config::LIGHT_THEME_PATH => VERSE_LIGHT_JSON,
            _ => {
                return Err(HighlightError::Fetch {
                    path: path.to_string(),
                    reason: "no embedded asset at this path".to_string(),
                })
            }
        };
        Ok(body.as_bytes().to_vec())
    }
}

/// Fetch and compile the grammar envelope.
pub fn fetch_grammar<S: AssetSource + ?Sized>(source: &S) -> Result<Grammar, HighlightError> {
    let bytes = source.fetch(config::GRAMMAR_PATH)?;
    let data: GrammarData =
        serde_json::from_slice(&bytes).map_err(|e| HighlightError::AssetFormat {
            path: config::GRAMMAR_PATH.to_string(),
            source: e,
        })?;
    Grammar::compile(data)
}

/// Fetch and resolve the theme asset at `path`.
pub fn fetch_theme<S: AssetSource + ?Sized>(
    source: &S,
    path: &str,
) -> Result<Theme, HighlightError> {
    let bytes = source.fetch(path)?;
    let data: ThemeData =
        serde_json::from_slice(&bytes).map_err(|e| HighlightError::AssetFormat {
            path: path.to_string(),
            source: e,
        })?;
    Theme::resolve(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_grammar_compiles() {
        let grammar = fetch_grammar(&EmbeddedAssetSource).unwrap();
        assert_eq!(grammar.name, "Verse");
        assert!(grammar.syntaxes.find_syntax_by_name("Verse").is_some());
    }

    #[test]
    fn test_embedded_themes_resolve() {
        let dark = fetch_theme(&EmbeddedAssetSource, config::DARK_THEME_PATH).unwrap();
        assert_eq!(dark.name, "verse-dark");
        let light = fetch_theme(&EmbeddedAssetSource, config::LIGHT_THEME_PATH).unwrap();
        assert_eq!(light.name, "verse-light");
        assert_ne!(dark.background, light.background);
    }

    #[test]
    fn test_embedded_source_rejects_unknown_path() {
        let result = EmbeddedAssetSource.fetch("/highlight/missing.json");
        assert!(matches!(result, Err(HighlightError::Fetch { .. })));
    }

    #[test]
    fn test_http_source_strips_trailing_slash() {
        let source = HttpAssetSource::new("https://docs.example.com/");
        assert_eq!(source.base_url, "https://docs.example.com");
    }
}
