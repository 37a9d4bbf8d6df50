//! Ruby extractor (tree-sitter-ruby).
//!
//! `method` and `singleton_method` (the latter's name prefixed with
//! `self.`) become functions/methods; `class`/`module` carry scope
//! through recursion. `require`/`require_relative` string arguments
//! register as imports with a base-name alias; call sites come from
//! `call`/`command`/`command_call`, `self` preserved as a receiver.

use super::common::{first_doc_line, line_of, make_call_site, named_arg_count, node_text, normalize_signature};
use super::{Extractor, Language, RawFile};
use crate::symbol::{normalize_calls, CallSite, Symbol, SymbolKind, stable_id};
use tree_sitter::{Node, Parser};

pub struct RubyExtractor;

impl Extractor for RubyExtractor {
    fn language(&self) -> Language {
        Language::Ruby
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rb"]
    }

    fn parse(&self, path: &str, source: &str) -> Result<RawFile, String> {
        let mut parser = Parser::new();
        let lang: tree_sitter::Language = tree_sitter_ruby::LANGUAGE.into();
        parser
            .set_language(&lang)
            .map_err(|e| format!("failed to set Ruby grammar: {e}"))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| "tree-sitter produced no tree".to_string())?;

        let mut out = RawFile::default();
        walk(path, tree.root_node(), source, &mut out);
        collect_requires(tree.root_node(), source, &mut out);
        Ok(out)
    }
}

fn walk(path: &str, node: Node, code: &str, out: &mut RawFile) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "method" => {
                if let Some(sym) = extract_method(path, child, code, false) {
                    out.symbols.push(sym);
                }
            }
            "singleton_method" => {
                if let Some(sym) = extract_method(path, child, code, true) {
                    out.symbols.push(sym);
                }
            }
            "class" => {
                if let Some(sym) = extract_scope(path, child, code, SymbolKind::Class) {
                    out.symbols.push(sym);
                }
                walk(path, child, code, out);
            }
            "module" => {
                if let Some(sym) = extract_scope(path, child, code, SymbolKind::Module) {
                    out.symbols.push(sym);
                }
                walk(path, child, code, out);
            }
            _ => walk(path, child, code, out),
        }
    }
}

fn extract_method(path: &str, node: Node, code: &str, singleton: bool) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let base_name = node_text(name_node, code).to_string();
    let name = if singleton {
        format!("self.{base_name}")
    } else {
        base_name
    };
    let kind = SymbolKind::Method;
    let params = node
        .child_by_field_name("parameters")
        .map(|n| node_text(n, code))
        .unwrap_or("");
    let signature = normalize_signature(&format!("def {name}{params}"));
    let line = line_of(node);
    let doc = leading_doc(node, code);
    let calls = normalize_calls(collect_calls(node, code));
    let id = stable_id(path, line, kind, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind,
        signature,
        line,
        doc,
        calls,
    })
}

fn extract_scope(path: &str, node: Node, code: &str, kind: SymbolKind) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, code).to_string();
    let superclass = node
        .child_by_field_name("superclass")
        .map(|n| format!(" < {}", node_text(n, code)))
        .unwrap_or_default();
    let signature = normalize_signature(&format!(
        "{} {name}{superclass}",
        if kind == SymbolKind::Class { "class" } else { "module" }
    ));
    let line = line_of(node);
    let doc = leading_doc(node, code);
    let id = stable_id(path, line, kind, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind,
        signature,
        line,
        doc,
        calls: Vec::new(),
    })
}

fn leading_doc(node: Node, code: &str) -> Option<String> {
    let sibling = node.prev_sibling()?;
    if sibling.kind() == "comment" && sibling.end_position().row + 1 == node.start_position().row {
        first_doc_line(node_text(sibling, code))
    } else {
        None
    }
}

fn collect_requires(root: Node, code: &str, out: &mut RawFile) {
    walk_requires(root, code, out);
}

fn walk_requires(node: Node, code: &str, out: &mut RawFile) {
    if matches!(node.kind(), "call" | "command") {
        if let Some(method_node) = node.child_by_field_name("method") {
            let method = node_text(method_node, code);
            if method == "require" || method == "require_relative" {
                if let Some(args) = node.child_by_field_name("arguments") {
                    if let Some(s) = first_string_literal(args, code) {
                        out.imports.push(s.clone());
                        let base = s.rsplit('/').next().unwrap_or(&s).to_string();
                        out.import_aliases.insert(base, s);
                    }
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_requires(child, code, out);
    }
}

fn first_string_literal(args: Node, code: &str) -> Option<String> {
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        if child.kind() == "string" {
            let text = node_text(child, code);
            return Some(text.trim_matches(|c| c == '"' || c == '\'').to_string());
        }
    }
    None
}

fn collect_calls(node: Node, code: &str) -> Vec<CallSite> {
    let mut calls = Vec::new();
    walk_calls(node, code, &mut calls);
    calls
}

fn walk_calls(node: Node, code: &str, calls: &mut Vec<CallSite>) {
    if matches!(node.kind(), "call" | "command" | "command_call") {
        if let Some(method_node) = node.child_by_field_name("method") {
            let name = node_text(method_node, code).to_string();
            let qualifier = node
                .child_by_field_name("receiver")
                .map(|n| node_text(n, code).to_string())
                .unwrap_or_default();
            let args = node.child_by_field_name("arguments");
            let raw = if qualifier.is_empty() {
                name.clone()
            } else {
                format!("{qualifier}.{name}")
            };
            if !name.trim().is_empty() {
                calls.push(make_call_site(
                    &qualifier,
                    &name,
                    &raw,
                    line_of(node),
                    named_arg_count(args),
                ));
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_calls(child, code, calls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> RawFile {
        RubyExtractor.parse("demo.rb", src).unwrap()
    }

    #[test]
    fn extracts_method_and_call() {
        let out = parse("class Foo\n  def bar\n    self.baz\n  end\n  def baz\n  end\nend\n");
        let bar = out.symbols.iter().find(|s| s.name == "bar").unwrap();
        assert_eq!(bar.calls[0].receiver.as_deref(), Some("self"));
    }

    #[test]
    fn singleton_method_name_prefixed() {
        let out = parse("class Foo\n  def self.make\n  end\nend\n");
        assert!(out.symbols.iter().any(|s| s.name == "self.make"));
    }

    #[test]
    fn require_relative_becomes_import() {
        let out = parse("require_relative 'lib/helper'\n");
        assert!(out.imports.contains(&"lib/helper".to_string()));
        assert_eq!(out.import_aliases.get("helper"), Some(&"lib/helper".to_string()));
    }
}
