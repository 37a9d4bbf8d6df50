//! Navigation index and queries (component C9).
//!
//! On-disk projection of the graph (schema version `nav-index-v1`)
//! plus the lookup operations the CLI's symbol/callers/callees/trace/
//! path/definition/references commands drive.

use crate::error::{SkellyError, SkellyResult};
use crate::graph::{Confidence, Graph};
use crate::symbol::SymbolKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub const NAV_INDEX_VERSION: &str = "nav-index-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavRecord {
    pub id: String,
    pub file: String,
    pub line: u32,
    pub name: String,
    pub kind: SymbolKind,
    pub signature: String,
    pub out_edges: Vec<String>,
    pub in_edges: Vec<String>,
    pub out_confidence: Vec<(String, Confidence)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavIndex {
    pub version: String,
    pub records: Vec<NavRecord>,
}

impl NavIndex {
    /// Enumerate all graph nodes in ID order.
    pub fn build(graph: &Graph) -> Self {
        let records = graph
            .nodes
            .values()
            .map(|node| {
                let mut out_confidence: Vec<(String, Confidence)> = node
                    .out_edge_confidence
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect();
                out_confidence.sort();
                NavRecord {
                    id: node.id.clone(),
                    file: node.file.clone(),
                    line: node.line,
                    name: node.name.clone(),
                    kind: node.kind,
                    signature: node.signature.clone(),
                    out_edges: node.out_edges.clone(),
                    in_edges: node.in_edges.clone(),
                    out_confidence,
                }
            })
            .collect();
        Self { version: NAV_INDEX_VERSION.to_string(), records }
    }

    fn by_id(&self) -> BTreeMap<&str, &NavRecord> {
        self.records.iter().map(|r| (r.id.as_str(), r)).collect()
    }

    /// Resolve a query string to a single record: exact ID match first,
    /// otherwise by name (ambiguous when more than one name matches).
    pub fn resolve_one(&self, query: &str) -> SkellyResult<&NavRecord> {
        if let Some(rec) = self.records.iter().find(|r| r.id == query) {
            return Ok(rec);
        }
        let matches: Vec<&NavRecord> = self.records.iter().filter(|r| r.name == query).collect();
        match matches.len() {
            0 => Err(SkellyError::SymbolNotFound { query: query.to_string() }),
            1 => Ok(matches[0]),
            _ => Err(SkellyError::AmbiguousQuery {
                query: query.to_string(),
                candidates: matches.iter().map(|r| r.id.clone()).collect(),
            }),
        }
    }

    pub fn callers(&self, query: &str) -> SkellyResult<Vec<(String, Confidence)>> {
        let by_id = self.by_id();
        let record = self.resolve_one(query)?;
        Ok(record
            .in_edges
            .iter()
            .map(|from| {
                let confidence = by_id
                    .get(from.as_str())
                    .and_then(|r| r.out_confidence.iter().find(|(id, _)| id == &record.id).map(|(_, c)| *c))
                    .unwrap_or(Confidence::Ambiguous);
                (from.clone(), confidence)
            })
            .collect())
    }

    pub fn callees(&self, query: &str) -> SkellyResult<Vec<(String, Confidence)>> {
        let record = self.resolve_one(query)?;
        Ok(record.out_confidence.clone())
    }

    /// Breadth-first trace up to `depth` hops. Revisits at a deeper
    /// depth than first seen are not re-enqueued.
    pub fn trace(&self, query: &str, depth: u32) -> SkellyResult<Vec<(u32, String, String, Confidence)>> {
        let by_id = self.by_id();
        let start = self.resolve_one(query)?;

        let mut seen: BTreeMap<String, u32> = BTreeMap::new();
        seen.insert(start.id.clone(), 0);
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();
        queue.push_back((start.id.clone(), 0));
        let mut hops = Vec::new();

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= depth {
                continue;
            }
            let Some(record) = by_id.get(current.as_str()) else { continue };
            for (target, confidence) in &record.out_confidence {
                let next_depth = current_depth + 1;
                hops.push((next_depth, current.clone(), target.clone(), *confidence));
                if !seen.contains_key(target) {
                    seen.insert(target.clone(), next_depth);
                    queue.push_back((target.clone(), next_depth));
                }
            }
        }

        hops.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
        Ok(hops)
    }

    /// Unweighted BFS shortest path over out_edges.
    pub fn path(&self, from: &str, to: &str) -> SkellyResult<Vec<String>> {
        let by_id = self.by_id();
        let start = self.resolve_one(from)?;
        let goal = self.resolve_one(to)?;

        if start.id == goal.id {
            return Ok(vec![start.id.clone()]);
        }

        let mut prev: BTreeMap<String, String> = BTreeMap::new();
        let mut visited: BTreeMap<String, bool> = BTreeMap::new();
        visited.insert(start.id.clone(), true);
        let mut queue = VecDeque::new();
        queue.push_back(start.id.clone());

        while let Some(current) = queue.pop_front() {
            let Some(record) = by_id.get(current.as_str()) else { continue };
            for next in &record.out_edges {
                if visited.contains_key(next) {
                    continue;
                }
                visited.insert(next.clone(), true);
                prev.insert(next.clone(), current.clone());
                if next == &goal.id {
                    let mut path = vec![goal.id.clone()];
                    let mut cursor = current.clone();
                    path.push(cursor.clone());
                    while let Some(p) = prev.get(&cursor) {
                        if p == &start.id {
                            break;
                        }
                        path.push(p.clone());
                        cursor = p.clone();
                    }
                    path.push(start.id.clone());
                    path.reverse();
                    path.dedup();
                    return Ok(path);
                }
                queue.push_back(next.clone());
            }
        }

        Err(SkellyError::NoPath { from: from.to_string(), to: to.to_string() })
    }

    /// Accepts a symbol specifier or `file:line`.
    pub fn definition(&self, query: &str) -> SkellyResult<&NavRecord> {
        if let Some((file, line)) = split_file_line(query) {
            return self.resolve_file_line(file, line);
        }
        self.resolve_one(query)
    }

    pub fn references(&self, query: &str) -> SkellyResult<&NavRecord> {
        self.definition(query)
    }

    fn resolve_file_line(&self, file: &str, line: u32) -> SkellyResult<&NavRecord> {
        if let Some(exact) = self.records.iter().find(|r| r.file == file && r.line == line) {
            return Ok(exact);
        }
        let mut candidates: Vec<&NavRecord> = self
            .records
            .iter()
            .filter(|r| r.file == file && r.line <= line)
            .collect();
        candidates.sort_by(|a, b| b.line.cmp(&a.line).then(a.id.cmp(&b.id)));
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| SkellyError::SymbolNotFound { query: format!("{file}:{line}") })
    }
}

fn split_file_line(query: &str) -> Option<(&str, u32)> {
    let (file, line) = query.rsplit_once(':')?;
    let line: u32 = line.parse().ok()?;
    Some((file, line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{FileSymbols, Language};
    use crate::symbol::{CallSite, Symbol, SymbolKind};
    use std::collections::BTreeMap;

    fn file(path: &str, symbols: Vec<Symbol>) -> FileSymbols {
        FileSymbols {
            path: path.to_string(),
            language: Language::Go,
            hash: "h".to_string(),
            symbols,
            imports: vec![],
            import_aliases: BTreeMap::new(),
        }
    }

    fn sym(path: &str, line: u32, name: &str, calls: Vec<CallSite>) -> Symbol {
        Symbol {
            id: format!("{path}|{line}|function|{name}"),
            name: name.to_string(),
            kind: SymbolKind::Function,
            signature: String::new(),
            line,
            doc: None,
            calls,
        }
    }

    fn call(name: &str) -> CallSite {
        CallSite {
            name: name.to_string(),
            qualifier: String::new(),
            receiver: None,
            arity: 0,
            line: 1,
            raw: name.to_string(),
        }
    }

    fn sample() -> NavIndex {
        let files = vec![file(
            "a.go",
            vec![
                sym("a.go", 1, "a", vec![call("b")]),
                sym("a.go", 2, "b", vec![call("c")]),
                sym("a.go", 3, "c", vec![]),
            ],
        )];
        let graph = Graph::build(&files);
        NavIndex::build(&graph)
    }

    #[test]
    fn callers_and_callees_resolve() {
        let nav = sample();
        let callees = nav.callees("a").unwrap();
        assert_eq!(callees[0].0, "a.go|2|function|b");
        let callers = nav.callers("b").unwrap();
        assert_eq!(callers[0].0, "a.go|1|function|a");
    }

    #[test]
    fn trace_respects_depth_and_sorts() {
        let nav = sample();
        let hops = nav.trace("a", 2).unwrap();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].0, 1);
        assert_eq!(hops[1].0, 2);
    }

    #[test]
    fn path_finds_shortest_route() {
        let nav = sample();
        let path = nav.path("a", "c").unwrap();
        assert_eq!(path, vec!["a.go|1|function|a", "a.go|2|function|b", "a.go|3|function|c"]);
    }

    #[test]
    fn path_errors_when_unreachable() {
        let nav = sample();
        assert!(nav.path("c", "a").is_err());
    }

    #[test]
    fn definition_by_file_line_picks_deepest_enclosing() {
        let nav = sample();
        let rec = nav.definition("a.go:2").unwrap();
        assert_eq!(rec.name, "b");
    }
}
