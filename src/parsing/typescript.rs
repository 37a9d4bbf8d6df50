//! TypeScript extractor (tree-sitter-typescript).
//!
//! Adds `interface_declaration` and `type_alias_declaration` on top of
//! the shared ECMAScript walker in [`super::ecma`]; `.tsx` files parse
//! with the TSX grammar variant, everything else with the plain one.

use super::{Extractor, Language, RawFile};
use tree_sitter::Parser;

pub struct TypeScriptExtractor;

impl Extractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "mts", "cts"]
    }

    fn parse(&self, path: &str, source: &str) -> Result<RawFile, String> {
        let mut parser = Parser::new();
        let lang: tree_sitter::Language = if path.ends_with(".tsx") {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        };
        parser
            .set_language(&lang)
            .map_err(|e| format!("failed to set TypeScript grammar: {e}"))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| "tree-sitter produced no tree".to_string())?;

        Ok(super::ecma::extract(path, source, tree.root_node(), Language::TypeScript))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;

    fn parse(src: &str) -> RawFile {
        TypeScriptExtractor.parse("demo.ts", src).unwrap()
    }

    #[test]
    fn interface_becomes_interface_kind() {
        let out = parse("interface Shape {\n  area(): number;\n}\n");
        assert_eq!(out.symbols[0].kind, SymbolKind::Interface);
        assert_eq!(out.symbols[0].name, "Shape");
    }

    #[test]
    fn type_alias_becomes_type_alias_kind() {
        let out = parse("type Id = string | number;\n");
        assert_eq!(out.symbols[0].kind, SymbolKind::TypeAlias);
        assert_eq!(out.symbols[0].name, "Id");
    }

    #[test]
    fn class_method_still_extracted() {
        let out = parse("class Repo {\n  find(id: string): void {\n    this.touch();\n  }\n  touch(): void {}\n}\n");
        let find = out.symbols.iter().find(|s| s.name == "find").unwrap();
        assert_eq!(find.kind, SymbolKind::Method);
        assert_eq!(find.calls[0].receiver.as_deref(), Some("this"));
    }

    #[test]
    fn type_only_named_import_strips_prefix() {
        let out = parse("import { type Id, load } from './mod';\n");
        assert_eq!(out.import_aliases.get("Id"), Some(&"./mod#Id".to_string()));
        assert_eq!(out.import_aliases.get("load"), Some(&"./mod#load".to_string()));
    }

    #[test]
    fn tsx_extension_parses_with_tsx_grammar() {
        let out = TypeScriptExtractor
            .parse("demo.tsx", "function App() { return null; }\n")
            .unwrap();
        assert_eq!(out.symbols[0].name, "App");
    }
}
