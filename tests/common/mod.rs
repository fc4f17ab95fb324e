//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use verselight::{AssetSource, EmbeddedAssetSource, HighlightError, Page};

/// Asset source that serves the embedded assets while counting fetches per
/// path, so tests can assert cache monotonicity.
pub struct CountingSource {
    inner: EmbeddedAssetSource,
    counts: Mutex<HashMap<String, usize>>,
}

impl CountingSource {
    pub fn new() -> Self {
        CountingSource {
            inner: EmbeddedAssetSource,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// How many times the asset at `path` has been fetched.
    pub fn count(&self, path: &str) -> usize {
        self.counts
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

impl AssetSource for CountingSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, HighlightError> {
        *self
            .counts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default() += 1;
        self.inner.fetch(path)
    }
}

/// Asset source where every fetch fails, for failure-propagation tests.
pub struct FailingSource;

impl AssetSource for FailingSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, HighlightError> {
        Err(HighlightError::Fetch {
            path: path.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// Build a documentation page with the given theme attribute and one marked
/// `<pre><code>` block per entry in `blocks`.
pub fn sample_page(theme_attr: Option<&str>, blocks: &[&str]) -> String {
    let attr = theme_attr
        .map(|v| format!(" data-theme=\"{v}\""))
        .unwrap_or_default();
    let blocks: String = blocks
        .iter()
        .map(|b| format!("<pre><code class=\"language-verse\">{b}</code></pre>"))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"{attr}><head><title>Verse types</title></head>\
         <body><main>{blocks}</main></body></html>"
    )
}

/// Plain-text content of every marked block on a page, in document order.
pub fn block_texts(html: &str) -> Vec<String> {
    let page = Page::parse(html);
    page.unrendered_blocks()
        .into_iter()
        .filter_map(|id| page.block_text(id))
        .collect()
}

/// A small Verse snippet used across tests.
pub const SNIPPET: &str = "# say hello\nGreet(Name:string):void =\n    Print(\"Hello\")";
