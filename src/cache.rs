//! Page-lifetime highlight cache
//!
//! One cache instance lives for as long as the page it serves. It holds the
//! compiled grammar (loaded once, immutable after), every theme fetched so
//! far keyed by asset path (grows monotonically, nothing is evicted), the
//! currently selected theme path, and the single highlighter session.
//!
//! The cache is an explicit value owned by the pipeline, not a process
//! global, so tests can build and reset one freely.

use std::collections::HashMap;

use crate::error::HighlightError;
use crate::grammar::Grammar;
use crate::session::Session;
use crate::theme::Theme;

/// Shared state threaded through every pipeline stage.
#[derive(Debug, Default)]
pub struct HighlightCache {
    grammar: Option<Grammar>,
    themes: HashMap<String, Theme>,
    selected: Option<String>,
    session: Option<Session>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything, restoring the freshly-constructed state.
    pub fn reset(&mut self) {
        tracing::debug!("resetting highlight cache");
        *self = Self::default();
    }

    pub fn grammar(&self) -> Option<&Grammar> {
        self.grammar.as_ref()
    }

    /// Store the compiled grammar. The first grammar wins; a second store is
    /// ignored so the loaded-once invariant holds even if callers race.
    pub fn set_grammar(&mut self, grammar: Grammar) {
        if self.grammar.is_some() {
            tracing::warn!("grammar already loaded; keeping the existing one");
            return;
        }
        self.grammar = Some(grammar);
    }

    pub fn theme(&self, path: &str) -> Option<&Theme> {
        self.themes.get(path)
    }

    /// Cache a fetched theme under its asset path. Existing entries are kept
    /// as-is; theme assets at a fixed path never change within a page
    /// lifetime.
    pub fn insert_theme(&mut self, path: &str, theme: Theme) {
        if self.themes.contains_key(path) {
            tracing::debug!(path, "theme already cached");
            return;
        }
        self.themes.insert(path.to_string(), theme);
    }

    pub fn themes_loaded(&self) -> usize {
        self.themes.len()
    }

    /// Record the theme path picked by the resolver for this run.
    pub fn select(&mut self, path: &str) {
        self.selected = Some(path.to_string());
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Create the session on first need, or load the theme at `path` into
    /// the existing session. The session value is never replaced once it
    /// exists.
    pub fn ensure_session(&mut self, path: &str) -> Result<(), HighlightError> {
        let theme = self
            .themes
            .get(path)
            .ok_or_else(|| HighlightError::UnknownTheme(path.to_string()))?;
        if self.session.is_none() {
            let grammar = self.grammar.as_ref().ok_or(HighlightError::MissingGrammar)?;
            let session = Session::new(grammar, theme);
            self.session = Some(session);
            return Ok(());
        }
        if let Some(session) = self.session.as_mut() {
            if !session.has_theme(&theme.name) {
                session.load_theme(theme);
            }
        }
        Ok(())
    }
}
