//! Go extractor (tree-sitter-go).
//!
//! Top-level functions, methods (receiver kept as a signature prefix),
//! and type declarations (struct/interface/type-alias). Imports come
//! from `import_spec` nodes; call sites from `call_expression`.

use super::common::{first_doc_line, line_of, make_call_site, named_arg_count, node_text, normalize_signature};
use super::{Extractor, Language, RawFile};
use crate::symbol::{normalize_calls, CallSite, Symbol, SymbolKind, stable_id};
use std::collections::BTreeMap;
use tree_sitter::{Node, Parser, Tree};

pub struct GoExtractor;

impl Extractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, path: &str, source: &str) -> Result<RawFile, String> {
        let mut parser = Parser::new();
        let lang: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        parser
            .set_language(&lang)
            .map_err(|e| format!("failed to set Go grammar: {e}"))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| "tree-sitter produced no tree".to_string())?;

        Ok(extract(path, source, &tree))
    }
}

fn extract(path: &str, code: &str, tree: &Tree) -> RawFile {
    let mut out = RawFile::default();
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "function_declaration" => {
                if let Some(sym) = extract_function(path, child, code, false) {
                    out.symbols.push(sym);
                }
            }
            "method_declaration" => {
                if let Some(sym) = extract_function(path, child, code, true) {
                    out.symbols.push(sym);
                }
            }
            "type_declaration" => {
                extract_type_decl(path, child, code, &mut out.symbols);
            }
            "import_declaration" => {
                extract_imports(child, code, &mut out.imports, &mut out.import_aliases);
            }
            _ => {}
        }
    }
    out
}

fn extract_function(path: &str, node: Node, code: &str, is_method: bool) -> Option<Symbol> {
    let name_field = if is_method { "name" } else { "name" };
    let name_node = node.child_by_field_name(name_field)?;
    let name = node_text(name_node, code).to_string();
    let kind = if is_method { SymbolKind::Method } else { SymbolKind::Function };

    let body = node.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let signature = normalize_signature(&code[node.start_byte()..header_end]);
    let line = line_of(node);
    let doc = leading_doc(node, code);
    let calls = collect_calls(body.unwrap_or(node), code);
    let id = stable_id(path, line, kind, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind,
        signature,
        line,
        doc,
        calls: normalize_calls(calls),
    })
}

fn extract_type_decl(path: &str, node: Node, code: &str, symbols: &mut Vec<Symbol>) {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, code).to_string();
        let underlying = spec.child_by_field_name("type");
        let kind = match underlying.map(|n| n.kind()) {
            Some("struct_type") => SymbolKind::Struct,
            Some("interface_type") => SymbolKind::Interface,
            _ => SymbolKind::TypeAlias,
        };
        let signature = normalize_signature(&format!("type {}", node_text(spec, code)));
        let line = line_of(spec);
        let doc = leading_doc(node, code);
        let id = stable_id(path, line, kind, &name, &signature);
        symbols.push(Symbol {
            id,
            name,
            kind,
            signature,
            line,
            doc,
            calls: Vec::new(),
        });
    }
}

fn extract_imports(node: Node, code: &str, imports: &mut Vec<String>, aliases: &mut BTreeMap<String, String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        extract_import_spec(child, code, imports, aliases);
    }
}

fn extract_import_spec(node: Node, code: &str, imports: &mut Vec<String>, aliases: &mut BTreeMap<String, String>) {
    match node.kind() {
        "import_spec_list" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                extract_import_spec(child, code, imports, aliases);
            }
        }
        "import_spec" => {
            let Some(path_node) = node.child_by_field_name("path") else {
                return;
            };
            let raw_path = node_text(path_node, code).trim_matches('"').to_string();
            if raw_path.is_empty() {
                return;
            }
            imports.push(raw_path.clone());
            let stated_name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, code).to_string());
            let alias = match stated_name.as_deref() {
                Some("_") | Some(".") | None => raw_path
                    .rsplit('/')
                    .next()
                    .unwrap_or(&raw_path)
                    .to_string(),
                Some(name) => name.to_string(),
            };
            if !alias.is_empty() {
                aliases.insert(alias, raw_path);
            }
        }
        _ => {}
    }
}

fn leading_doc(node: Node, code: &str) -> Option<String> {
    let sibling = node.prev_sibling()?;
    if sibling.kind() == "comment" && sibling.end_position().row + 1 == node.start_position().row {
        first_doc_line(node_text(sibling, code))
    } else {
        None
    }
}

fn collect_calls(body: Node, code: &str) -> Vec<CallSite> {
    let mut calls = Vec::new();
    walk_calls(body, code, &mut calls);
    calls
}

fn walk_calls(node: Node, code: &str, calls: &mut Vec<CallSite>) {
    if node.kind() == "call_expression" {
        if let Some(func) = node.child_by_field_name("function") {
            let (qualifier, name, raw) = resolve_callee(func, code);
            if !name.trim().is_empty() {
                let args = node.child_by_field_name("arguments");
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

fn resolve_callee(node: Node, code: &str) -> (String, String, String) {
    match node.kind() {
        "identifier" => {
            let name = node_text(node, code).to_string();
            (String::new(), name.clone(), name)
        }
        "selector_expression" => {
            let operand = node.child_by_field_name("operand");
            let field = node.child_by_field_name("field");
            let qualifier = operand.map(|n| node_text(n, code).to_string()).unwrap_or_default();
            let name = field.map(|n| node_text(n, code).to_string()).unwrap_or_default();
            let raw = node_text(node, code).to_string();
            (qualifier, name, raw)
        }
        "parenthesized_expression" => node
            .named_child(0)
            .map(|inner| resolve_callee(inner, code))
            .unwrap_or_else(|| (String::new(), String::new(), node_text(node, code).to_string())),
        "index_expression" | "generic_type" => {
            let inner = node.child_by_field_name("operand").or_else(|| node.named_child(0));
            inner
                .map(|n| resolve_callee(n, code))
                .unwrap_or_else(|| (String::new(), String::new(), node_text(node, code).to_string()))
        }
        _ => {
            let raw = node_text(node, code).to_string();
            (String::new(), raw.clone(), raw)
        }
    }
}
