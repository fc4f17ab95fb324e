//! Bootstrap-or-update pipeline
//!
//! One run takes a page from its current state to fully highlighted under
//! the currently resolved theme: resolve the theme attribute, load whatever
//! assets are missing from the cache (grammar and theme fetches run
//! concurrently), create or update the session, then rewrite the blocks.
//!
//! Stage ordering within a run is fixed: asset loads happen before session
//! creation or update, which happens before the render loop. The pipeline
//! owns the page-lifetime cache; callers that need run-level mutual
//! exclusion get it from [`crate::watch::ThemeObserver`], which serializes
//! runs by construction.

use std::thread;

use crate::assets::{self, AssetSource, EmbeddedAssetSource, HttpAssetSource};
use crate::cache::HighlightCache;
use crate::error::HighlightError;
use crate::page::Page;
use crate::render;
use crate::theme;

/// The highlighting pipeline plus its page-lifetime state.
#[derive(Debug)]
pub struct Pipeline<S = HttpAssetSource> {
    source: S,
    cache: HighlightCache,
}

impl Pipeline<HttpAssetSource> {
    /// Pipeline fetching assets from the documentation site at `base_url`.
    pub fn over_http(base_url: impl Into<String>) -> Self {
        Pipeline::new(HttpAssetSource::new(base_url))
    }
}

impl Pipeline<EmbeddedAssetSource> {
    /// Pipeline serving the compiled-in assets; works offline.
    pub fn embedded() -> Self {
        Pipeline::new(EmbeddedAssetSource)
    }
}

impl<S: AssetSource> Pipeline<S> {
    pub fn new(source: S) -> Self {
        Pipeline {
            source,
            cache: HighlightCache::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &HighlightCache {
        &self.cache
    }

    /// Drop all cached state (grammar, themes, session).
    pub fn reset(&mut self) {
        self.cache.reset();
    }

    /// Run the full pipeline against a page. Returns the number of blocks
    /// rewritten.
    pub fn run(&mut self, page: &mut Page, system_dark: bool) -> Result<usize, HighlightError> {
        let variant = theme::resolve(page.theme_attr().as_deref(), system_dark);
        let path = variant.asset_path();
        self.cache.select(path);

        self.ensure_assets(path)?;
        self.cache.ensure_session(path)?;

        let theme_name = self
            .cache
            .theme(path)
            .map(|t| t.name.clone())
            .ok_or_else(|| HighlightError::UnknownTheme(path.to_string()))?;
        let session = self
            .cache
            .session()
            .ok_or(HighlightError::MissingGrammar)?;

        let rendered = render::render_page(page, session, &theme_name)?;
        tracing::info!(theme = %theme_name, rendered, "pipeline run complete");
        Ok(rendered)
    }

    /// Fetch whatever the cache is missing for this run. The grammar is
    /// fetched at most once per cache lifetime and each theme path at most
    /// once; when both are needed the fetches run concurrently and this
    /// blocks until both finish.
    fn ensure_assets(&mut self, path: &str) -> Result<(), HighlightError> {
        let need_grammar = self.cache.grammar().is_none();
        let need_theme = self.cache.theme(path).is_none();
        if !need_grammar && !need_theme {
            tracing::trace!(path, "assets already cached");
            return Ok(());
        }

        let source = &self.source;
        let (grammar, theme) = thread::scope(|scope| {
            let grammar_task =
                need_grammar.then(|| scope.spawn(move || assets::fetch_grammar(source)));
            let theme_task =
                need_theme.then(|| scope.spawn(move || assets::fetch_theme(source, path)));
            (grammar_task.map(join_task), theme_task.map(join_task))
        });

        if let Some(grammar) = grammar {
            self.cache.set_grammar(grammar?);
        }
        if let Some(theme) = theme {
            self.cache.insert_theme(path, theme?);
        }
        Ok(())
    }
}

fn join_task<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
