//! Theme variants and theme asset resolution
//!
//! A page selects its theme through the `data-theme` attribute on the root
//! element. Resolution is a two-way branch: an explicit dark value, or the
//! follow-system sentinel combined with a dark system preference, pick the
//! dark variant; every other value falls through to light.
//!
//! Theme assets are JSON: a name, base colors, and a mapping from scope
//! selectors to colors. The raw [`ThemeData`] is resolved into a [`Theme`]
//! with parsed colors and a ready-to-use engine theme.

use std::collections::BTreeMap;

use serde::Deserialize;
use syntect::highlighting::{
    Color, ScopeSelectors, StyleModifier, Theme as EngineTheme, ThemeItem, ThemeSettings,
};

use crate::config;
use crate::error::HighlightError;

/// The two theme variants a page can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Site-relative path of this variant's theme asset.
    ///
    /// The mapping is fixed: the same attribute value always resolves to the
    /// same path, which doubles as the theme cache key.
    pub fn asset_path(self) -> &'static str {
        match self {
            ThemeVariant::Dark => config::DARK_THEME_PATH,
            ThemeVariant::Light => config::LIGHT_THEME_PATH,
        }
    }
}

/// Resolve the active theme variant from the page attribute and the system
/// color preference.
///
/// Unrecognized and absent values resolve light; the light variant is the
/// explicit default, not an error.
pub fn resolve(attr: Option<&str>, system_dark: bool) -> ThemeVariant {
    let variant = match attr {
        Some(value) if value == config::THEME_DARK => ThemeVariant::Dark,
        Some(value) if value == config::THEME_SYSTEM && system_dark => ThemeVariant::Dark,
        _ => ThemeVariant::Light,
    };
    tracing::debug!(?attr, system_dark, ?variant, "resolved theme variant");
    variant
}

/// Raw theme asset as parsed from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeData {
    pub name: String,
    pub background: String,
    pub foreground: String,
    /// Scope selector -> hex color.
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
}

/// Resolved theme: validated colors plus the engine-side theme built from
/// the scope table.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    /// Background hex, emitted verbatim on rendered `<pre>` wrappers.
    pub background: String,
    /// Default text color hex.
    pub foreground: String,
    /// Engine theme handed to the highlighter.
    pub engine: EngineTheme,
}

impl Theme {
    /// Validate and resolve raw theme data.
    pub fn resolve(data: ThemeData) -> Result<Self, HighlightError> {
        let background =
            parse_color(&data.background).map_err(|reason| HighlightError::ThemeColor {
                theme: data.name.clone(),
                value: data.background.clone(),
                reason,
            })?;
        let foreground =
            parse_color(&data.foreground).map_err(|reason| HighlightError::ThemeColor {
                theme: data.name.clone(),
                value: data.foreground.clone(),
                reason,
            })?;

        let mut settings = ThemeSettings::default();
        settings.background = Some(background);
        settings.foreground = Some(foreground);

        let mut scopes = Vec::with_capacity(data.scopes.len());
        for (selector, hex) in &data.scopes {
            let scope: ScopeSelectors = selector
                .parse()
                .map_err(|e| HighlightError::ThemeScope {
                    theme: data.name.clone(),
                    selector: selector.clone(),
                    reason: format!("{e:?}"),
                })?;
            let color = parse_color(hex).map_err(|reason| HighlightError::ThemeColor {
                theme: data.name.clone(),
                value: hex.clone(),
                reason,
            })?;
            scopes.push(ThemeItem {
                scope,
                style: StyleModifier {
                    foreground: Some(color),
                    background: None,
                    font_style: None,
                },
            });
        }

        let engine = EngineTheme {
            name: Some(data.name.clone()),
            author: None,
            settings,
            scopes,
        };

        tracing::debug!(theme = %data.name, scopes = data.scopes.len(), "resolved theme");
        Ok(Theme {
            name: data.name,
            background: data.background,
            foreground: data.foreground,
            engine,
        })
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA` into an engine color.
fn parse_color(s: &str) -> Result<Color, String> {
    let hex = s.trim_start_matches('#');
    let byte =
        |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string());
    match hex.len() {
        6 => Ok(Color {
            r: byte(0..2)?,
            g: byte(2..4)?,
            b: byte(4..6)?,
            a: 255,
        }),
        8 => Ok(Color {
            r: byte(0..2)?,
            g: byte(2..4)?,
            b: byte(4..6)?,
            a: byte(6..8)?,
        }),
        _ => Err(format!("expected 6 or 8 hex digits, got {:?}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dark_resolves_dark() {
        assert_eq!(resolve(Some("dark"), false), ThemeVariant::Dark);
        assert_eq!(resolve(Some("dark"), true), ThemeVariant::Dark);
    }

    #[test]
    fn test_system_follows_preference() {
        assert_eq!(resolve(Some("system"), true), ThemeVariant::Dark);
        assert_eq!(resolve(Some("system"), false), ThemeVariant::Light);
    }

    #[test]
    fn test_unrecognized_values_default_light() {
        for value in ["light", "DARK", "auto", "", "darkness", "system "] {
            assert_eq!(resolve(Some(value), true), ThemeVariant::Light, "{value:?}");
        }
        assert_eq!(resolve(None, true), ThemeVariant::Light);
    }

    #[test]
    fn test_variant_paths_are_stable() {
        assert_eq!(ThemeVariant::Dark.asset_path(), config::DARK_THEME_PATH);
        assert_eq!(ThemeVariant::Light.asset_path(), config::LIGHT_THEME_PATH);
        assert_ne!(
            ThemeVariant::Dark.asset_path(),
            ThemeVariant::Light.asset_path()
        );
    }

    #[test]
    fn test_parse_color_6() {
        let c = parse_color("#1b1b1d").unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (0x1b, 0x1b, 0x1d, 255));
    }

    #[test]
    fn test_parse_color_8() {
        let c = parse_color("#1b1b1d80").unwrap();
        assert_eq!(c.a, 0x80);
    }

    #[test]
    fn test_parse_color_rejects_garbage() {
        assert!(parse_color("#fff").is_err());
        assert!(parse_color("red").is_err());
        assert!(parse_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_resolve_theme_data() {
        let data: ThemeData = serde_json::from_str(
            r##"{"name":"t","background":"#000000","foreground":"#ffffff","scopes":{"comment":"#00ff00"}}"##,
        )
        .unwrap();
        let theme = Theme::resolve(data).unwrap();
        assert_eq!(theme.name, "t");
        assert_eq!(theme.engine.scopes.len(), 1);
        assert_eq!(
            theme.engine.settings.background.unwrap(),
            Color {
                r: 0,
                g: 0,
                b: 0,
                a: 255
            }
        );
    }

    #[test]
    fn test_resolve_rejects_bad_scope_color() {
        let data: ThemeData = serde_json::from_str(
            r##"{"name":"t","background":"#000000","foreground":"#ffffff","scopes":{"comment":"green"}}"##,
        )
        .unwrap();
        assert!(matches!(
            Theme::resolve(data),
            Err(HighlightError::ThemeColor { .. })
        ));
    }
}
