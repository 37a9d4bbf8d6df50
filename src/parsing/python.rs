//! Python extractor (tree-sitter-python).
//!
//! `function_definition` is emitted as a method iff nested inside a
//! class body; `class_definition` recurses with class context tracked
//! only to make that decision. Docstrings are the first line of the
//! leading string expression in a body.

use super::common::{first_doc_line, line_of, make_call_site, named_arg_count, node_text, normalize_signature};
use super::{Extractor, Language, RawFile};
use crate::symbol::{normalize_calls, CallSite, Symbol, SymbolKind, stable_id};
use tree_sitter::{Node, Parser};

pub struct PythonExtractor;

impl Extractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &str, source: &str) -> Result<RawFile, String> {
        let mut parser = Parser::new();
        let lang: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        parser
            .set_language(&lang)
            .map_err(|e| format!("failed to set Python grammar: {e}"))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| "tree-sitter produced no tree".to_string())?;

        let mut out = RawFile::default();
        walk(path, tree.root_node(), source, false, &mut out);
        Ok(out)
    }
}

fn walk(path: &str, node: Node, code: &str, in_class: bool, out: &mut RawFile) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "function_definition" => {
                if let Some(sym) = extract_function(path, child, code, in_class) {
                    out.symbols.push(sym);
                }
            }
            "class_definition" => {
                if let Some(sym) = extract_class(path, child, code) {
                    out.symbols.push(sym);
                }
                if let Some(body) = child.child_by_field_name("body") {
                    walk(path, body, code, true, out);
                }
            }
            "import_statement" => extract_import(child, code, out),
            "import_from_statement" => extract_import_from(child, code, out),
            "decorated_definition" => walk(path, child, code, in_class, out),
            _ => {}
        }
    }
}

fn extract_function(path: &str, node: Node, code: &str, in_class: bool) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, code).to_string();
    let kind = if in_class { SymbolKind::Method } else { SymbolKind::Function };
    let body = node.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let signature = normalize_signature(
        code[node.start_byte()..header_end]
            .trim_end()
            .trim_end_matches(':'),
    );
    let line = line_of(node);
    let doc = body.and_then(|b| docstring_of(b, code));
    let calls = body.map(|b| collect_calls(b, code)).unwrap_or_default();
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

fn extract_class(path: &str, node: Node, code: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, code).to_string();
    let body = node.child_by_field_name("body");
    let header_end = body.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let signature = normalize_signature(
        code[node.start_byte()..header_end]
            .trim_end()
            .trim_end_matches(':'),
    );
    let line = line_of(node);
    let doc = body.and_then(|b| docstring_of(b, code));
    let id = stable_id(path, line, SymbolKind::Class, &name, &signature);

    Some(Symbol {
        id,
        name,
        kind: SymbolKind::Class,
        signature,
        line,
        doc,
        calls: Vec::new(),
    })
}

fn docstring_of(body: Node, code: &str) -> Option<String> {
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    first_doc_line(node_text(expr, code))
}

fn extract_import(node: Node, code: &str, out: &mut RawFile) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let module = node_text(child, code).to_string();
                out.imports.push(module.clone());
                let alias = module.rsplit('.').next().unwrap_or(&module).to_string();
                out.import_aliases.insert(alias, module);
            }
            "aliased_import" => {
                let Some(name_node) = child.child_by_field_name("name") else {
                    continue;
                };
                let module = node_text(name_node, code).to_string();
                out.imports.push(module.clone());
                if let Some(alias_node) = child.child_by_field_name("alias") {
                    out.import_aliases
                        .insert(node_text(alias_node, code).to_string(), module);
                }
            }
            _ => {}
        }
    }
}

fn extract_import_from(node: Node, code: &str, out: &mut RawFile) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };
    let module = node_text(module_node, code).to_string();
    out.imports.push(module.clone());

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let sym = node_text(child, code).to_string();
                out.import_aliases
                    .insert(sym.clone(), format!("{module}#{sym}"));
            }
            "aliased_import" => {
                let (Some(name_node), Some(alias_node)) = (
                    child.child_by_field_name("name"),
                    child.child_by_field_name("alias"),
                ) else {
                    continue;
                };
                let sym = node_text(name_node, code).to_string();
                let alias = node_text(alias_node, code).to_string();
                out.import_aliases
                    .insert(alias, format!("{module}#{sym}"));
            }
            _ => {}
        }
    }
}

fn collect_calls(body: Node, code: &str) -> Vec<CallSite> {
    let mut calls = Vec::new();
    walk_calls(body, code, &mut calls);
    calls
}

fn walk_calls(node: Node, code: &str, calls: &mut Vec<CallSite>) {
    if node.kind() == "call" {
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
        "attribute" => {
            let object = node.child_by_field_name("object");
            let attribute = node.child_by_field_name("attribute");
            let qualifier = object.map(|n| node_text(n, code).to_string()).unwrap_or_default();
            let name = attribute.map(|n| node_text(n, code).to_string()).unwrap_or_default();
            let raw = node_text(node, code).to_string();
            (qualifier, name, raw)
        }
        _ => {
            let raw = node_text(node, code).to_string();
            (String::new(), raw.clone(), raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> RawFile {
        PythonExtractor.parse("demo.py", src).unwrap()
    }

    #[test]
    fn method_detected_inside_class() {
        let out = parse("class C:\n    def m(self):\n        self.helper()\n    def helper(self):\n        pass\n");
        let m = out.symbols.iter().find(|s| s.name == "m").unwrap();
        assert_eq!(m.kind, SymbolKind::Method);
        assert_eq!(m.calls[0].receiver.as_deref(), Some("self"));
    }

    #[test]
    fn top_level_function_is_function() {
        let out = parse("def f():\n    pass\n");
        assert_eq!(out.symbols[0].kind, SymbolKind::Function);
    }

    #[test]
    fn docstring_is_first_line() {
        let out = parse("def f():\n    \"\"\"Does a thing.\n\n    More detail.\n    \"\"\"\n    pass\n");
        assert_eq!(out.symbols[0].doc.as_deref(), Some("Does a thing."));
    }

    #[test]
    fn import_from_emits_module_hash_symbol() {
        let out = parse("from pkg.sub import helper as h\n");
        assert_eq!(
            out.import_aliases.get("h"),
            Some(&"pkg.sub#helper".to_string())
        );
    }
}
