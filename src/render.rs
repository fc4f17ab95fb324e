//! Render loop
//!
//! Rewrites every marked code block in a page to highlighted markup. The
//! page is held hidden for the duration of the loop so a large page never
//! paints half-rendered, and the prior state is restored on every exit
//! path: success, skipped blocks, or a conversion error aborting the pass.

use crate::error::HighlightError;
use crate::page::Page;
use crate::session::Session;

/// Render all marked blocks under the named theme. Returns the number of
/// blocks actually rewritten.
pub fn render_page(
    page: &mut Page,
    session: &Session,
    theme_name: &str,
) -> Result<usize, HighlightError> {
    let prior = page.hide();
    let result = render_blocks(page, session, theme_name);
    page.restore(prior);
    result
}

fn render_blocks(
    page: &mut Page,
    session: &Session,
    theme_name: &str,
) -> Result<usize, HighlightError> {
    // Snapshot before mutating; replacements must not perturb iteration.
    let blocks = page.unrendered_blocks();
    if blocks.is_empty() {
        tracing::debug!("no marked code blocks on page");
        return Ok(0);
    }

    let mut rendered = 0;
    for id in blocks {
        let Some(text) = page.block_text(id) else {
            tracing::warn!("marked block vanished before rendering; skipping");
            continue;
        };
        let markup = session.highlight(&text, theme_name)?;
        if page.replace_block(id, &markup) {
            rendered += 1;
        }
    }
    tracing::debug!(rendered, theme = theme_name, "render pass finished");
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{fetch_grammar, fetch_theme, EmbeddedAssetSource};
    use crate::config;

    fn session() -> Session {
        let grammar = fetch_grammar(&EmbeddedAssetSource).unwrap();
        let theme = fetch_theme(&EmbeddedAssetSource, config::DARK_THEME_PATH).unwrap();
        Session::new(&grammar, &theme)
    }

    fn page() -> Page {
        Page::parse(
            "<html data-theme=\"dark\"><body>\
             <pre><code class=\"language-verse\"># greeting\nPrint(\"hi\")</code></pre>\
             </body></html>",
        )
    }

    #[test]
    fn test_render_rewrites_blocks() {
        let mut page = page();
        let n = render_page(&mut page, &session(), "verse-dark").unwrap();
        assert_eq!(n, 1);
        let html = page.to_html();
        assert!(html.contains(config::PRE_CLASS));
        assert!(html.contains(config::MARKER_CLASS));
        assert!(html.contains("background-color:#1b1b1d"));
    }

    #[test]
    fn test_render_empty_page_is_noop() {
        let mut page = Page::parse("<html><body><p>prose only</p></body></html>");
        let n = render_page(&mut page, &session(), "verse-dark").unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_visibility_restored_on_success() {
        let mut page = page();
        render_page(&mut page, &session(), "verse-dark").unwrap();
        assert!(!page.is_hidden());
    }

    #[test]
    fn test_visibility_restored_on_error() {
        let mut page = page();
        let result = render_page(&mut page, &session(), "no-such-theme");
        assert!(result.is_err());
        assert!(!page.is_hidden());
    }

    #[test]
    fn test_prior_hidden_state_is_kept() {
        let mut page = page();
        page.hide();
        render_page(&mut page, &session(), "verse-dark").unwrap();
        assert!(page.is_hidden());
    }
}
