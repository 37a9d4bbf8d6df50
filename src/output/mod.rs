//! Output writers (component C8): text and line-delimited JSON
//! emitters with content-stable write suppression.

pub mod atomic;
pub mod jsonl;
pub mod text;

use crate::graph::Graph;
use crate::parsing::FileSymbols;
use atomic::write_if_changed;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "jsonl" | "json" => Ok(OutputFormat::Jsonl),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Write every artifact for `format` under `artifacts_dir`. Returns the
/// relative-path → content-hash map of everything written (changed or
/// not), for comparison against a prior run's `output_hashes`.
pub fn write_artifacts(
    artifacts_dir: &Path,
    files: &[FileSymbols],
    graph: &Graph,
    format: OutputFormat,
) -> io::Result<BTreeMap<String, String>> {
    let mut hashes = BTreeMap::new();

    match format {
        OutputFormat::Text => {
            write_one(artifacts_dir, "index.txt", text::render_index(files).as_bytes(), &mut hashes)?;
            write_one(artifacts_dir, "graph.txt", text::render_graph(graph).as_bytes(), &mut hashes)?;
            for (dir, content) in text::render_modules(files) {
                let rel = format!("modules/{dir}.txt");
                write_one(artifacts_dir, &rel, content.as_bytes(), &mut hashes)?;
            }
        }
        OutputFormat::Jsonl => {
            write_one(artifacts_dir, "symbols.jsonl", jsonl::render_symbols(files).as_bytes(), &mut hashes)?;
            write_one(artifacts_dir, "edges.jsonl", jsonl::render_edges(graph).as_bytes(), &mut hashes)?;
            let manifest = jsonl::render_manifest(files, graph)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            write_one(artifacts_dir, "manifest.json", manifest.as_bytes(), &mut hashes)?;
        }
    }

    Ok(hashes)
}

fn write_one(
    artifacts_dir: &Path,
    rel: &str,
    content: &[u8],
    hashes: &mut BTreeMap<String, String>,
) -> io::Result<()> {
    let path = artifacts_dir.join(rel);
    write_if_changed(&path, content)?;
    hashes.insert(rel.to_string(), crate::hash::hash_bytes(content));
    Ok(())
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
    fn text_artifacts_written_once_and_stable() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![file("a.go")];
        let graph = Graph::build(&files);
        let first = write_artifacts(dir.path(), &files, &graph, OutputFormat::Text).unwrap();
        assert!(dir.path().join("index.txt").exists());
        assert!(dir.path().join("graph.txt").exists());
        let second = write_artifacts(dir.path(), &files, &graph, OutputFormat::Text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn jsonl_artifacts_include_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![file("a.go")];
        let graph = Graph::build(&files);
        write_artifacts(dir.path(), &files, &graph, OutputFormat::Jsonl).unwrap();
        assert!(dir.path().join("manifest.json").exists());
    }
}
