//! Grammar envelope parsing and compilation
//!
//! The grammar ships as a JSON envelope carrying the language name, its
//! root scope, and the syntax definition as an array of lines. The envelope
//! is parsed with serde and the definition handed to the engine, which
//! compiles it into the syntax set used by every conversion afterwards.

use serde::Deserialize;
use syntect::parsing::syntax_definition::SyntaxDefinition;
use syntect::parsing::{SyntaxSet, SyntaxSetBuilder};

use crate::error::HighlightError;

/// Raw grammar envelope as parsed from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarData {
    /// Language name; conversions look the compiled syntax up by this name.
    pub name: String,
    /// Root scope of the definition, e.g. `source.verse`.
    #[serde(default)]
    pub scope: Option<String>,
    /// Syntax definition, split into lines for readability of the asset.
    pub syntax: Vec<String>,
}

/// A compiled grammar: the language name plus the engine syntax set built
/// from the envelope. Loaded once per page lifetime and immutable after.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub name: String,
    pub syntaxes: SyntaxSet,
}

impl Grammar {
    /// Compile a parsed envelope into a usable grammar.
    pub fn compile(data: GrammarData) -> Result<Self, HighlightError> {
        let source = data.syntax.join("\n");
        let definition = SyntaxDefinition::load_from_str(&source, true, Some(&data.name))
            .map_err(|e| HighlightError::GrammarCompile {
                name: data.name.clone(),
                reason: e.to_string(),
            })?;

        let mut builder = SyntaxSetBuilder::new();
        builder.add(definition);
        let syntaxes = builder.build();

        tracing::info!(grammar = %data.name, scope = ?data.scope, "compiled grammar");
        Ok(Grammar {
            name: data.name,
            syntaxes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_envelope() -> GrammarData {
        serde_json::from_value(serde_json::json!({
            "name": "Tiny",
            "scope": "source.tiny",
            "syntax": [
                "%YAML 1.2",
                "---",
                "name: Tiny",
                "scope: source.tiny",
                "contexts:",
                "  main:",
                "    - match: '\\b(let)\\b'",
                "      scope: keyword.control.tiny",
            ],
        }))
        .unwrap()
    }

    #[test]
    fn test_compile_tiny_grammar() {
        let grammar = Grammar::compile(tiny_envelope()).unwrap();
        assert_eq!(grammar.name, "Tiny");
        assert!(grammar.syntaxes.find_syntax_by_name("Tiny").is_some());
    }

    #[test]
    fn test_compile_rejects_invalid_definition() {
        let mut data = tiny_envelope();
        data.syntax = vec!["not a syntax definition".to_string()];
        assert!(matches!(
            Grammar::compile(data),
            Err(HighlightError::GrammarCompile { .. })
        ));
    }

    #[test]
    fn test_envelope_requires_syntax_field() {
        let result: Result<GrammarData, _> =
            serde_json::from_str(r#"{"name": "Tiny", "scope": "source.tiny"}"#);
        assert!(result.is_err());
    }
}
