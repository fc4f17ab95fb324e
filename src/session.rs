//! Highlighter session lifecycle
//!
//! The session wraps the highlighting engine. It is built once from the
//! compiled grammar and the first resolved theme, then kept for the rest of
//! the page lifetime: later theme changes load the new theme into the
//! existing session instead of rebuilding it, so the compiled syntax set and
//! whatever the engine caches internally survive every swap.

use std::collections::HashMap;

use syntect::easy::HighlightLines;
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config;
use crate::error::HighlightError;
use crate::grammar::Grammar;
use crate::theme::Theme;

/// A long-lived text-to-markup converter over one grammar and a growable
/// set of themes.
#[derive(Debug)]
pub struct Session {
    syntaxes: SyntaxSet,
    language: String,
    themes: HashMap<String, Theme>,
}

impl Session {
    /// Build a session from the grammar and an initial theme.
    pub fn new(grammar: &Grammar, theme: &Theme) -> Self {
        tracing::info!(language = %grammar.name, theme = %theme.name, "creating highlighter session");
        let mut themes = HashMap::new();
        themes.insert(theme.name.clone(), theme.clone());
        Session {
            syntaxes: grammar.syntaxes.clone(),
            language: grammar.name.clone(),
            themes,
        }
    }

    /// Language name conversions are performed under.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether a theme with this name has been loaded.
    pub fn has_theme(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Number of themes currently loaded.
    pub fn loaded_themes(&self) -> usize {
        self.themes.len()
    }

    /// Load an additional theme into the existing session. Loading a theme
    /// that is already present replaces it in place; the session itself is
    /// never rebuilt.
    pub fn load_theme(&mut self, theme: &Theme) {
        tracing::debug!(theme = %theme.name, "loading theme into session");
        self.themes.insert(theme.name.clone(), theme.clone());
    }

    /// Convert plain text into highlighted markup under the named theme.
    ///
    /// Output shape: `<pre class=… style=…><code class=…>…</code></pre>`,
    /// with the theme's base colors inlined on the wrapper so each block is
    /// self-contained.
    pub fn highlight(&self, text: &str, theme_name: &str) -> Result<String, HighlightError> {
        let syntax = self
            .syntaxes
            .find_syntax_by_name(&self.language)
            .ok_or_else(|| HighlightError::UnknownLanguage(self.language.clone()))?;
        let theme = self
            .themes
            .get(theme_name)
            .ok_or_else(|| HighlightError::UnknownTheme(theme_name.to_string()))?;

        let mut highlighter = HighlightLines::new(syntax, &theme.engine);
        let mut body = String::with_capacity(text.len() * 2);
        for line in LinesWithEndings::from(text) {
            let regions = highlighter.highlight_line(line, &self.syntaxes)?;
            body.push_str(&styled_line_to_highlighted_html(
                &regions[..],
                IncludeBackground::No,
            )?);
        }

        Ok(format!(
            r#"<pre class="{}" style="background-color:{};color:{}"><code class="{}">{}</code></pre>"#,
            config::PRE_CLASS,
            theme.background,
            theme.foreground,
            config::CODE_CLASS,
            body
        ))
    }
}
