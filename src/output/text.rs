//! Human-readable text emitters: `index.txt`, `graph.txt`, and one
//! `modules/<topdir>.txt` per top-level source directory.
//!
//! `graph.txt` uses a `|N|`-encoded record per symbol: the ID, the
//! count of pipe-delimited fields that follow, then those fields
//! (name, kind, signature, comma-joined caller IDs, comma-joined
//! callee IDs) — chosen so a line can be split unambiguously even when
//! a signature itself contains `|`.

use crate::graph::Graph;
use crate::parsing::FileSymbols;
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub fn render_index(files: &[FileSymbols]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(out, "{} ({})", file.path, file.language);
        for symbol in &file.symbols {
            let _ = writeln!(out, "  {}:{} {} {}", symbol.line, symbol.kind, symbol.name, symbol.signature);
        }
    }
    out
}

pub fn render_graph(graph: &Graph) -> String {
    let mut out = String::new();
    for node in graph.nodes.values() {
        let callers = node.in_edges.join(",");
        let callees = node.out_edges.join(",");
        let _ = writeln!(
            out,
            "{}|5|{}|{}|{}|{}|{}",
            node.id, node.name, node.kind, node.signature, callers, callees
        );
    }
    out
}

pub fn render_modules(files: &[FileSymbols]) -> BTreeMap<String, String> {
    let mut by_dir: BTreeMap<String, Vec<&FileSymbols>> = BTreeMap::new();
    for file in files {
        let dir = match file.path.find('/') {
            Some(idx) => file.path[..idx].to_string(),
            None => "root".to_string(),
        };
        by_dir.entry(dir).or_default().push(file);
    }

    by_dir
        .into_iter()
        .map(|(dir, files)| {
            let owned: Vec<FileSymbols> = files.into_iter().cloned().collect();
            (dir, render_index(&owned))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Language;
    use crate::symbol::{Symbol, SymbolKind};
    use std::collections::BTreeMap as Map;

    fn file(path: &str) -> FileSymbols {
        FileSymbols {
            path: path.to_string(),
            language: Language::Go,
            hash: "h".to_string(),
            symbols: vec![Symbol {
                id: format!("{path}|1|function|f"),
                name: "f".to_string(),
                kind: SymbolKind::Function,
                signature: "func f()".to_string(),
                line: 1,
                doc: None,
                calls: vec![],
            }],
            imports: vec![],
            import_aliases: Map::new(),
        }
    }

    #[test]
    fn index_lists_each_file_and_symbol() {
        let out = render_index(&[file("pkg/a.go")]);
        assert!(out.contains("pkg/a.go (go)"));
        assert!(out.contains("f"));
    }

    #[test]
    fn modules_group_by_top_level_directory() {
        let modules = render_modules(&[file("pkg/a.go"), file("main.go")]);
        assert!(modules.contains_key("pkg"));
        assert!(modules.contains_key("root"));
    }

    #[test]
    fn graph_encodes_five_fields() {
        let graph = Graph::build(&[file("pkg/a.go")]);
        let out = render_graph(&graph);
        let line = out.lines().next().unwrap();
        assert!(line.contains("|5|"));
    }
}
