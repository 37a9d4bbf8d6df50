//! `symbol` / `callers` / `callees` / `trace` / `path` / `definition` /
//! `references` command handlers. All read the persisted navigation
//! (and, for fuzzy `symbol`, search) index rather than re-parsing.
//!
//! `definition`/`references` additionally try a configured language
//! server before falling back to the nav-index result: best-effort,
//! degrading silently to the parser-only answer when no server binary
//! is on `PATH` or it returns nothing usable.

use crate::config::Settings;
use crate::error::{SkellyError, SkellyResult};
use crate::integrations::lsp::{self, SystemRunner};
use crate::nav::{NavIndex, NavRecord};
use crate::search::SearchIndex;
use std::path::Path;

const NAV_FILE: &str = "nav-index.json";
const SEARCH_FILE: &str = "search-index.json";

fn load_nav(root: &Path, settings: &Settings) -> SkellyResult<NavIndex> {
    let path = settings.artifacts_path(root).join(NAV_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| SkellyError::MissingArtifact { name: NAV_FILE.to_string() })?;
    serde_json::from_str(&text).map_err(|e| SkellyError::StateCorrupt { path, reason: e.to_string() })
}

fn load_search(root: &Path, settings: &Settings) -> SkellyResult<SearchIndex> {
    let path = settings.artifacts_path(root).join(SEARCH_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| SkellyError::MissingArtifact { name: SEARCH_FILE.to_string() })?;
    serde_json::from_str(&text).map_err(|e| SkellyError::StateCorrupt { path, reason: e.to_string() })
}

pub fn symbol(root: &Path, settings: &Settings, query: &str, fuzzy: bool, limit: Option<usize>, json: bool) -> SkellyResult<()> {
    let nav = load_nav(root, settings)?;
    let limit = limit.unwrap_or(settings.search_limit);

    match nav.resolve_one(query) {
        Ok(record) => {
            if json {
                println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
            } else {
                println!("{} {} {}:{}", record.id, record.kind, record.file, record.line);
                println!("  {}", record.signature);
            }
            Ok(())
        }
        Err(SkellyError::SymbolNotFound { .. }) if fuzzy => {
            let search = load_search(root, settings)?;
            let results = search.search(query, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&results).unwrap_or_default());
            } else {
                for (id, score) in &results {
                    println!("{score:.3}  {id}");
                }
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

pub fn callers(root: &Path, settings: &Settings, query: &str, json: bool) -> SkellyResult<()> {
    let nav = load_nav(root, settings)?;
    let edges = nav.callers(query)?;
    print_edges(&edges, json)
}

pub fn callees(root: &Path, settings: &Settings, query: &str, json: bool) -> SkellyResult<()> {
    let nav = load_nav(root, settings)?;
    let edges = nav.callees(query)?;
    print_edges(&edges, json)
}

fn print_edges(edges: &[(String, crate::graph::Confidence)], json: bool) -> SkellyResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(edges).unwrap_or_default());
    } else {
        for (id, confidence) in edges {
            println!("{id}  ({confidence:?})");
        }
    }
    Ok(())
}

pub fn trace(root: &Path, settings: &Settings, query: &str, depth: u32, json: bool) -> SkellyResult<()> {
    let nav = load_nav(root, settings)?;
    let hops = nav.trace(query, depth)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&hops).unwrap_or_default());
    } else {
        for (depth, from, to, confidence) in &hops {
            println!("{depth}  {from} -> {to}  ({confidence:?})");
        }
    }
    Ok(())
}

pub fn path(root: &Path, settings: &Settings, from: &str, to: &str, json: bool) -> SkellyResult<()> {
    let nav = load_nav(root, settings)?;
    let route = nav.path(from, to)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&route).unwrap_or_default());
    } else {
        println!("{}", route.join(" -> "));
    }
    Ok(())
}

pub fn definition(root: &Path, settings: &Settings, query: &str, json: bool) -> SkellyResult<()> {
    let nav = load_nav(root, settings)?;
    let record = nav.definition(query)?;
    let (file, line) = refine_with_lsp(root, record, "definition").unwrap_or_else(|| (record.file.clone(), record.line));
    if json {
        println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
    } else {
        println!("{} {}:{}", record.id, file, line);
    }
    Ok(())
}

pub fn references(root: &Path, settings: &Settings, query: &str, json: bool) -> SkellyResult<()> {
    let nav = load_nav(root, settings)?;
    let record = nav.references(query)?;
    let (file, line) = refine_with_lsp(root, record, "references").unwrap_or_else(|| (record.file.clone(), record.line));
    if json {
        println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
    } else {
        println!("{} {}:{}", record.id, file, line);
    }
    Ok(())
}

/// The language-server binary conventionally associated with a file
/// extension, mirroring `orchestrator::doctor`'s availability table.
fn language_server_binary(path: &str) -> Option<&'static str> {
    match std::path::Path::new(path).extension().and_then(|e| e.to_str())? {
        "go" => Some("gopls"),
        "py" => Some("pyright"),
        "rb" => Some("solargraph"),
        "ts" | "tsx" | "mts" | "cts" | "js" | "jsx" | "mjs" | "cjs" => Some("typescript-language-server"),
        _ => None,
    }
}

/// Ask the record's language server to refine `command` (`"definition"`
/// or `"references"`) at `record.file:record.line`. `None` when no
/// server binary is configured for the language or the query fails.
fn refine_with_lsp(root: &Path, record: &NavRecord, command: &str) -> Option<(String, u32)> {
    let binary = language_server_binary(&record.file)?;
    let spec = format!("{}:{}", record.file, record.line);
    let locations = lsp::query_locations(&SystemRunner, root, binary, &[command, &spec])?;
    let first = locations.into_iter().next()?;
    Some((first.path.to_string_lossy().into_owned(), first.line))
}
