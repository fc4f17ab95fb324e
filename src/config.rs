//! Fixed constants for the highlighting pipeline
//!
//! There is intentionally no configuration file and no environment-variable
//! lookup here: the attribute name, asset paths, and class markers are part
//! of the page contract and never vary per deployment. The only runtime
//! input is the base URL handed to [`crate::assets::HttpAssetSource`].

/// Attribute on the root `<html>` element that selects the page theme.
pub const THEME_ATTR: &str = "data-theme";

/// Attribute value forcing the dark theme.
pub const THEME_DARK: &str = "dark";

/// Attribute value deferring to the system color preference.
pub const THEME_SYSTEM: &str = "system";

/// Site-relative path of the grammar envelope.
pub const GRAMMAR_PATH: &str = "/highlight/verse.grammar.json";

/// Site-relative path of the dark theme asset.
pub const DARK_THEME_PATH: &str = "/highlight/verse-dark.json";

/// Site-relative path of the light theme asset.
pub const LIGHT_THEME_PATH: &str = "/highlight/verse-light.json";

/// Class identifying a Verse code block. Applied by the documentation
/// generator to `<code>` elements, and re-applied to rendered output so a
/// later pass can select the same blocks again.
pub const MARKER_CLASS: &str = "language-verse";

/// Class carried by the `<pre>` wrapper of rendered markup.
pub const PRE_CLASS: &str = "verselight";

/// Class carried by the `<code>` element of rendered markup.
pub const CODE_CLASS: &str = "verselight-code";
