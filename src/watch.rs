//! Page watching for theme changes
//!
//! Uses the `notify` crate to watch the page file and re-run the pipeline
//! when its theme attribute changes. Events are deliberately not debounced;
//! instead runs are single-flight: everything queued while a run executes is
//! drained and coalesced into at most one follow-up run, so rapid attribute
//! toggles can never interleave two pipeline runs.
//!
//! The observer's own write-back produces a watcher event too; it is
//! harmless because the re-read attribute then equals the last one seen and
//! the run is skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::assets::AssetSource;
use crate::error::HighlightError;
use crate::page::Page;
use crate::pipeline::Pipeline;

/// Watches one page file and keeps its rendered blocks in sync with the
/// theme attribute.
pub struct ThemeObserver<S: AssetSource> {
    page_path: PathBuf,
    pipeline: Pipeline<S>,
    system_dark: bool,
    /// Attribute value at the last completed run; `None` until the first.
    last_theme: Option<Option<String>>,
    rx: Receiver<Result<Event, notify::Error>>,
    _watcher: RecommendedWatcher,
}

impl<S: AssetSource> ThemeObserver<S> {
    /// Start watching `page_path`. The watch is registered on the parent
    /// directory so editors that replace the file on save are still seen.
    pub fn new(
        page_path: impl Into<PathBuf>,
        pipeline: Pipeline<S>,
        system_dark: bool,
    ) -> Result<Self, HighlightError> {
        let page_path = page_path.into();
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        let dir = page_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::info!(page = %page_path.display(), "watching page for theme changes");
        Ok(ThemeObserver {
            page_path,
            pipeline,
            system_dark,
            last_theme: None,
            rx,
            _watcher: watcher,
        })
    }

    pub fn page_path(&self) -> &Path {
        &self.page_path
    }

    pub fn pipeline(&self) -> &Pipeline<S> {
        &self.pipeline
    }

    /// Render the page unconditionally. Used for the bootstrap pass before
    /// any attribute change has been observed.
    pub fn render_now(&mut self) -> Result<usize, HighlightError> {
        Ok(self.sync(true)?.unwrap_or(0))
    }

    /// Process pending watcher events (non-blocking). Returns true when a
    /// render pass actually ran.
    pub fn poll(&mut self) -> Result<bool, HighlightError> {
        if !self.drain_events() {
            return Ok(false);
        }
        Ok(self.sync(false)?.is_some())
    }

    /// Blocking loop: bootstrap render, then serve attribute changes until
    /// the watcher goes away. Render failures after bootstrap are logged and
    /// the loop keeps serving, matching a host that only logs rejections.
    pub fn run(&mut self) -> Result<(), HighlightError> {
        self.render_now()?;
        loop {
            match self.rx.recv() {
                Ok(first) => {
                    let mut relevant = match first {
                        Ok(event) => self.concerns_page(&event),
                        Err(e) => {
                            tracing::warn!("page watcher error: {e}");
                            false
                        }
                    };
                    // Single-flight: coalesce everything already queued into
                    // this one run.
                    if self.drain_events() {
                        relevant = true;
                    }
                    if relevant {
                        if let Err(e) = self.sync(false) {
                            tracing::warn!("render pass failed: {e}");
                        }
                    }
                }
                Err(_) => return Ok(()),
            }
        }
    }

    /// Drain queued events, reporting whether any of them concerned the
    /// watched page.
    fn drain_events(&mut self) -> bool {
        let mut relevant = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(event) if self.concerns_page(&event) => relevant = true,
                Ok(_) => {}
                Err(e) => tracing::warn!("page watcher error: {e}"),
            }
        }
        relevant
    }

    fn concerns_page(&self, event: &Event) -> bool {
        let kind_ok = matches!(
            event.kind,
            EventKind::Any | EventKind::Create(_) | EventKind::Modify(_)
        );
        kind_ok
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == self.page_path.file_name())
    }

    /// Re-read the page and, if the theme attribute changed since the last
    /// completed run (or `force` is set), run the pipeline and write the
    /// rendered page back. Returns the block count, or `None` when skipped.
    fn sync(&mut self, force: bool) -> Result<Option<usize>, HighlightError> {
        let html = fs::read_to_string(&self.page_path)?;
        let mut page = Page::parse(&html);
        let attr = page.theme_attr();
        if !force && self.last_theme.as_ref() == Some(&attr) {
            tracing::debug!("theme attribute unchanged; nothing to do");
            return Ok(None);
        }
        let rendered = self.pipeline.run(&mut page, self.system_dark)?;
        fs::write(&self.page_path, page.to_html())?;
        self.last_theme = Some(attr);
        tracing::info!(rendered, "page re-rendered");
        Ok(Some(rendered))
    }
}
