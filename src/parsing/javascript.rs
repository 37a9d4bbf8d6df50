//! JavaScript extractor (tree-sitter-javascript).
//!
//! Thin wrapper over the shared ECMAScript walker in [`super::ecma`];
//! see that module for the extraction rules common to JS and TS.

use super::{Extractor, Language, RawFile};
use tree_sitter::Parser;

pub struct JavaScriptExtractor;

impl Extractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn parse(&self, path: &str, source: &str) -> Result<RawFile, String> {
        let mut parser = Parser::new();
        let lang: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        parser
            .set_language(&lang)
            .map_err(|e| format!("failed to set JavaScript grammar: {e}"))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| "tree-sitter produced no tree".to_string())?;

        Ok(super::ecma::extract(path, source, tree.root_node(), Language::JavaScript))
    }
}
