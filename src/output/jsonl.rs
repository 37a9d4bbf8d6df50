//! Line-delimited JSON emitters: `symbols.jsonl`, `edges.jsonl`, and
//! `manifest.json`.

use crate::graph::{Confidence, Graph};
use crate::parsing::FileSymbols;
use crate::symbol::{Symbol, SymbolKind};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Serialize)]
struct SymbolRecord<'a> {
    file: &'a str,
    line: u32,
    id: &'a str,
    name: &'a str,
    kind: SymbolKind,
    signature: &'a str,
    doc: Option<&'a str>,
}

/// One symbol per line, sorted by file, then line, then ID.
pub fn render_symbols(files: &[FileSymbols]) -> String {
    let mut rows: Vec<(&str, u32, &Symbol)> = Vec::new();
    for file in files {
        for symbol in &file.symbols {
            rows.push((file.path.as_str(), symbol.line, symbol));
        }
    }
    rows.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)).then(a.2.id.cmp(&b.2.id)));

    let mut out = String::new();
    for (file, line, symbol) in rows {
        let record = SymbolRecord {
            file,
            line,
            id: &symbol.id,
            name: &symbol.name,
            kind: symbol.kind,
            signature: &symbol.signature,
            doc: symbol.doc.as_deref(),
        };
        let _ = writeln!(out, "{}", serde_json::to_string(&record).unwrap_or_default());
    }
    out
}

#[derive(Serialize)]
struct EdgeRecord<'a> {
    from: &'a str,
    to: &'a str,
    confidence: Confidence,
}

/// One edge per line, sorted by (from, to) for determinism.
pub fn render_edges(graph: &Graph) -> String {
    let mut rows: Vec<(&str, &str, Confidence)> = Vec::new();
    for node in graph.nodes.values() {
        for target in &node.out_edges {
            let confidence = node
                .out_edge_confidence
                .get(target)
                .copied()
                .unwrap_or(Confidence::Ambiguous);
            rows.push((node.id.as_str(), target.as_str(), confidence));
        }
    }
    rows.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(b.1)));

    let mut out = String::new();
    for (from, to, confidence) in rows {
        let record = EdgeRecord { from, to, confidence };
        let _ = writeln!(out, "{}", serde_json::to_string(&record).unwrap_or_default());
    }
    out
}

#[derive(Serialize)]
pub struct Manifest {
    pub parser_version: u32,
    pub output_version: u32,
    pub file_count: usize,
    pub symbol_count: usize,
    pub edge_count: usize,
    pub files: Vec<String>,
}

pub fn render_manifest(files: &[FileSymbols], graph: &Graph) -> serde_json::Result<String> {
    let manifest = Manifest {
        parser_version: crate::state::PARSER_VERSION,
        output_version: crate::state::OUTPUT_VERSION,
        file_count: files.len(),
        symbol_count: files.iter().map(|f| f.symbols.len()).sum(),
        edge_count: graph.nodes.values().map(|n| n.out_edges.len()).sum(),
        files: files.iter().map(|f| f.path.clone()).collect(),
    };
    serde_json::to_string_pretty(&manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Language;
    use crate::symbol::{CallSite, Symbol, SymbolKind};
    use std::collections::BTreeMap;

    fn file(path: &str) -> FileSymbols {
        FileSymbols {
            path: path.to_string(),
            language: Language::Go,
            hash: "h".to_string(),
            symbols: vec![
                Symbol {
                    id: format!("{path}|2|function|b"),
                    name: "b".to_string(),
                    kind: SymbolKind::Function,
                    signature: String::new(),
                    line: 2,
                    doc: None,
                    calls: vec![],
                },
                Symbol {
                    id: format!("{path}|1|function|a"),
                    name: "a".to_string(),
                    kind: SymbolKind::Function,
                    signature: String::new(),
                    line: 1,
                    doc: None,
                    calls: vec![CallSite {
                        name: "b".to_string(),
                        qualifier: String::new(),
                        receiver: None,
                        arity: 0,
                        line: 1,
                        raw: "b".to_string(),
                    }],
                },
            ],
            imports: vec![],
            import_aliases: BTreeMap::new(),
        }
    }

    #[test]
    fn symbols_sorted_by_file_line_id() {
        let out = render_symbols(&[file("a.go")]);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("\"name\":\"a\""));
        assert!(lines[1].contains("\"name\":\"b\""));
    }

    #[test]
    fn edges_serialize_with_confidence() {
        let graph = Graph::build(&[file("a.go")]);
        let out = render_edges(&graph);
        assert!(out.contains("\"confidence\""));
    }

    #[test]
    fn manifest_reports_totals() {
        let files = vec![file("a.go")];
        let graph = Graph::build(&files);
        let json = render_manifest(&files, &graph).unwrap();
        assert!(json.contains("\"file_count\": 1"));
        assert!(json.contains("\"symbol_count\": 2"));
    }
}
