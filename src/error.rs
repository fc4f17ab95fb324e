//! Error types for the highlighting pipeline
//!
//! Everything fallible in the crate funnels into [`HighlightError`]. Asset
//! failures carry the site-relative path they were fetched from so a watcher
//! log line is enough to identify the broken asset.

use thiserror::Error;

/// Errors produced by asset loading, the highlighter session, the render
/// loop, and the page watcher.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// Network-level failure retrieving an asset. Never retried; the
    /// current pipeline run aborts.
    #[error("failed to fetch asset {path}: {reason}")]
    Fetch { path: String, reason: String },

    /// The asset bytes were retrieved but did not parse as the expected
    /// JSON shape.
    #[error("failed to parse asset {path}")]
    AssetFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The grammar envelope parsed but its syntax definition did not
    /// compile.
    #[error("failed to compile grammar {name}: {reason}")]
    GrammarCompile { name: String, reason: String },

    /// A theme asset referenced a color that is not `#RRGGBB`/`#RRGGBBAA`.
    #[error("invalid color {value:?} in theme {theme}: {reason}")]
    ThemeColor {
        theme: String,
        value: String,
        reason: String,
    },

    /// A theme asset carried an unparseable scope selector.
    #[error("invalid scope selector {selector:?} in theme {theme}: {reason}")]
    ThemeScope {
        theme: String,
        selector: String,
        reason: String,
    },

    /// A session was requested before the grammar was loaded.
    #[error("no grammar loaded")]
    MissingGrammar,

    /// A theme was requested before its asset was loaded, or a conversion
    /// named a theme the session has never seen.
    #[error("theme {0:?} not loaded")]
    UnknownTheme(String),

    /// The grammar set has no syntax under the configured language name.
    #[error("language {0:?} not present in grammar set")]
    UnknownLanguage(String),

    /// The highlighting engine rejected a block's content.
    #[error(transparent)]
    Engine(#[from] syntect::Error),

    /// The page file watcher could not be set up.
    #[error(transparent)]
    Watch(#[from] notify::Error),

    /// Reading or writing the watched page file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
