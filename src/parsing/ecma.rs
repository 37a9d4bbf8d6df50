//! Shared extraction for JavaScript and TypeScript (component C4).
//!
//! `function_declaration`, `method_definition` (recursed into from
//! class bodies), `class_declaration`, `interface_declaration`,
//! `type_alias_declaration`, and arrow-function/function-expression
//! `variable_declarator`s become symbols. Exports are transparent: an
//! `export_statement` is skipped in favor of recursing into its
//! `declaration` field. Imports parse the module string plus alias
//! names from default/namespace/named bindings, with `type`-only
//! prefixes stripped.

use super::common::{first_doc_line, line_of, make_call_site, named_arg_count, node_text, normalize_signature};
use super::{Language, RawFile};
use crate::symbol::{normalize_calls, CallSite, Symbol, SymbolKind, stable_id};
use tree_sitter::Node;

pub fn extract(path: &str, code: &str, root: Node, _language: Language) -> RawFile {
    let mut out = RawFile::default();
    walk(path, root, code, false, &mut out);
    out
}

fn walk(path: &str, node: Node, code: &str, in_class: bool, out: &mut RawFile) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "function_declaration" | "generator_function_declaration" => {
                if let Some(sym) = extract_function(path, child, code) {
                    out.symbols.push(sym);
                }
            }
            "method_definition" => {
                if let Some(sym) = extract_method(path, child, code) {
                    out.symbols.push(sym);
                }
            }
            "class_declaration" => {
                if let Some(sym) = extract_class(path, child, code) {
                    out.symbols.push(sym);
                }
                if let Some(body) = child.child_by_field_name("body") {
                    walk(path, body, code, true, out);
                }
            }
            "interface_declaration" => {
                if let Some(sym) = extract_named_block(path, child, code, SymbolKind::Interface, "interface") {
                    out.symbols.push(sym);
                }
            }
            "type_alias_declaration" => {
                if let Some(sym) = extract_type_alias(path, child, code) {
                    out.symbols.push(sym);
                }
            }
            "variable_declarator" => {
                if !in_class {
                    if let Some(sym) = extract_variable_function(path, child, code) {
                        out.symbols.push(sym);
                    }
                }
            }
            "export_statement" => {
                if let Some(decl) = child.child_by_field_name("declaration") {
                    // Transparent: process the inner declaration as if
                    // the `export` keyword weren't there.
                    let mut synthetic = out.symbols.len();
                    walk_single(path, decl, code, in_class, out);
                    // mark exported names public is not modeled (no
                    // Visibility field in this data model); nothing
                    // further to do besides having recursed.
                    let _ = &mut synthetic;
                } else {
                    walk(path, child, code, in_class, out);
                }
            }
            "import_statement" => extract_import(child, code, out),
            _ => {
                if !in_class {
                    walk(path, child, code, in_class, out);
                }
            }
        }
    }
}

/// Dispatch a single declaration node the same way `walk`'s match arm
/// would, used when unwrapping `export_statement.declaration`.
fn walk_single(path: &str, node: Node, code: &str, in_class: bool, out: &mut RawFile) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(sym) = extract_function(path, node, code) {
                out.symbols.push(sym);
            }
        }
        "class_declaration" => {
            if let Some(sym) = extract_class(path, node, code) {
                out.symbols.push(sym);
            }
            if let Some(body) = node.child_by_field_name("body") {
                walk(path, body, code, true, out);
            }
        }
        "interface_declaration" => {
            if let Some(sym) = extract_named_block(path, node, code, SymbolKind::Interface, "interface") {
                out.symbols.push(sym);
            }
        }
        "type_alias_declaration" => {
            if let Some(sym) = extract_type_alias(path, node, code) {
                out.symbols.push(sym);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for decl in node.named_children(&mut cursor) {
                if decl.kind() == "variable_declarator" {
                    if let Some(sym) = extract_variable_function(path, decl, code) {
                        out.symbols.push(sym);
                    }
                }
            }
        }
        _ => walk(path, node, code, in_class, out),
    }
}

fn extract_function(path: &str, node: Node, code: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, code).to_string();
    let body = node.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let signature = normalize_signature(&code[node.start_byte()..header_end]);
    let line = line_of(node);
    let doc = leading_doc(node, code);
    let calls = body.map(|b| collect_calls(b, code)).unwrap_or_default();
    let id = stable_id(path, line, SymbolKind::Function, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind: SymbolKind::Function,
        signature,
        line,
        doc,
        calls: normalize_calls(calls),
    })
}

fn extract_method(path: &str, node: Node, code: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, code).to_string();
    let body = node.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let signature = normalize_signature(&code[node.start_byte()..header_end]);
    let line = line_of(node);
    let doc = leading_doc(node, code);
    let calls = body.map(|b| collect_calls(b, code)).unwrap_or_default();
    let id = stable_id(path, line, SymbolKind::Method, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind: SymbolKind::Method,
        signature,
        line,
        doc,
        calls: normalize_calls(calls),
    })
}

fn extract_class(path: &str, node: Node, code: &str) -> Option<Symbol> {
    extract_named_block(path, node, code, SymbolKind::Class, "class")
}

fn extract_named_block(
    path: &str,
    node: Node,
    code: &str,
    kind: SymbolKind,
    _keyword: &str,
) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, code).to_string();
    let body = node.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let signature = normalize_signature(&code[node.start_byte()..header_end]);
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

fn extract_type_alias(path: &str, node: Node, code: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, code).to_string();
    let signature = normalize_signature(node_text(node, code));
    let line = line_of(node);
    let doc = leading_doc(node, code);
    let id = stable_id(path, line, SymbolKind::TypeAlias, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind: SymbolKind::TypeAlias,
        signature,
        line,
        doc,
        calls: Vec::new(),
    })
}

fn extract_variable_function(path: &str, node: Node, code: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let value = node.child_by_field_name("value")?;
    if !matches!(value.kind(), "arrow_function" | "function_expression" | "generator_function") {
        return None;
    }
    let name = node_text(name_node, code).to_string();
    let body = value.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte()).unwrap_or(value.end_byte());
    let signature = normalize_signature(&code[node.start_byte()..header_end]);
    let line = line_of(node);
    let doc = leading_doc(node, code);
    let calls = body.map(|b| collect_calls(b, code)).unwrap_or_default();
    let id = stable_id(path, line, SymbolKind::Function, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind: SymbolKind::Function,
        signature,
        line,
        doc,
        calls: normalize_calls(calls),
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

fn extract_import(node: Node, code: &str, out: &mut RawFile) {
    let Some(source_node) = node.child_by_field_name("source") else {
        return;
    };
    let module = node_text(source_node, code)
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string();
    out.imports.push(module.clone());

    let mut collected = 0usize;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collected += collect_import_clause(child, code, &module, out);
    }

    if collected == 0 {
        let base = module.rsplit('/').next().unwrap_or(&module).to_string();
        if !base.is_empty() {
            out.import_aliases.insert(base, module);
        }
    }
}

fn collect_import_clause(node: Node, code: &str, module: &str, out: &mut RawFile) -> usize {
    match node.kind() {
        "import_clause" => {
            let mut count = 0;
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                count += collect_import_clause(child, code, module, out);
            }
            count
        }
        "identifier" => {
            // default import binding
            out.import_aliases
                .insert(node_text(node, code).to_string(), module.to_string());
            1
        }
        "namespace_import" => {
            if let Some(ident) = node.named_child(0) {
                out.import_aliases
                    .insert(node_text(ident, code).to_string(), module.to_string());
                return 1;
            }
            0
        }
        "named_imports" => {
            let mut count = 0;
            let mut cursor = node.walk();
            for spec in node.named_children(&mut cursor) {
                if spec.kind() != "import_specifier" {
                    continue;
                }
                let name_node = spec.child_by_field_name("name");
                let alias_node = spec.child_by_field_name("alias");
                let Some(name_node) = name_node else { continue };
                let member = node_text(name_node, code)
                    .trim_start_matches("type")
                    .trim()
                    .to_string();
                let alias = alias_node
                    .map(|n| node_text(n, code).to_string())
                    .unwrap_or_else(|| member.clone());
                out.import_aliases
                    .insert(alias, format!("{module}#{member}"));
                count += 1;
            }
            count
        }
        _ => 0,
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
        "member_expression" => {
            let object = node.child_by_field_name("object");
            let property = node.child_by_field_name("property");
            let qualifier = object.map(|n| node_text(n, code).to_string()).unwrap_or_default();
            let name = property.map(|n| node_text(n, code).to_string()).unwrap_or_default();
            let raw = node_text(node, code).to_string();
            (qualifier, name, raw)
        }
        "parenthesized_expression" => node
            .named_child(0)
            .map(|inner| resolve_callee(inner, code))
            .unwrap_or_else(|| (String::new(), String::new(), node_text(node, code).to_string())),
        _ => {
            let raw = node_text(node, code).to_string();
            (String::new(), raw.clone(), raw)
        }
    }
}
