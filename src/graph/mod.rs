//! Call-graph construction (component C6): scoped call resolution,
//! confidence tagging, and PageRank.

use crate::parsing::FileSymbols;
use crate::symbol::SymbolKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Ambiguous,
    Heuristic,
    Resolved,
}

impl Confidence {
    fn merge(self, other: Confidence) -> Confidence {
        self.max(other)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub file: String,
    pub name: String,
    pub kind: SymbolKind,
    pub signature: String,
    pub line: u32,
    pub doc: Option<String>,
    pub out_edges: Vec<String>,
    pub in_edges: Vec<String>,
    pub out_edge_confidence: BTreeMap<String, Confidence>,
    pub page_rank: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: BTreeMap<String, Node>,
    /// file path -> node IDs, sorted by (line, id)
    pub files: BTreeMap<String, Vec<String>>,
}

impl Graph {
    /// Build a full graph from every file in `set`, including PageRank.
    pub fn build(set: &[FileSymbols]) -> Self {
        let mut graph = Self::materialize(set);
        graph.resolve_edges(set);
        graph.finalize();
        graph.page_rank(20, 0.85);
        graph
    }

    /// Build a graph restricted to `set` without PageRank, used to
    /// refresh per-file dependencies for an impacted subset.
    pub fn build_partial(set: &[FileSymbols]) -> Self {
        let mut graph = Self::materialize(set);
        graph.resolve_edges(set);
        graph.finalize();
        graph
    }

    fn materialize(set: &[FileSymbols]) -> Self {
        let mut nodes = BTreeMap::new();
        let mut files: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for file in set {
            let mut ids = Vec::new();
            for symbol in &file.symbols {
                nodes.insert(
                    symbol.id.clone(),
                    Node {
                        id: symbol.id.clone(),
                        file: file.path.clone(),
                        name: symbol.name.clone(),
                        kind: symbol.kind,
                        signature: symbol.signature.clone(),
                        line: symbol.line,
                        doc: symbol.doc.clone(),
                        out_edges: Vec::new(),
                        in_edges: Vec::new(),
                        out_edge_confidence: BTreeMap::new(),
                        page_rank: 0.0,
                    },
                );
                ids.push((symbol.line, symbol.id.clone()));
            }
            ids.sort();
            files.insert(file.path.clone(), ids.into_iter().map(|(_, id)| id).collect());
        }

        Self { nodes, files }
    }

    fn resolve_edges(&mut self, set: &[FileSymbols]) {
        let by_path: BTreeMap<&str, &FileSymbols> =
            set.iter().map(|f| (f.path.as_str(), f)).collect();

        let mut pending: Vec<(String, String, Confidence)> = Vec::new();

        for file in set {
            let method_names: Vec<&str> = file
                .symbols
                .iter()
                .filter(|s| s.kind == SymbolKind::Method)
                .map(|s| s.name.as_str())
                .collect();
            let file_names: Vec<&str> = file.symbols.iter().map(|s| s.name.as_str()).collect();
            let top_dir = top_level_dir(&file.path);

            for caller in &file.symbols {
                let caller_is_method = caller.kind == SymbolKind::Method;
                for call in &caller.calls {
                    let Some(target) = resolve_call(
                        call,
                        file,
                        caller_is_method,
                        &method_names,
                        &file_names,
                        &by_path,
                        set,
                        top_dir,
                    ) else {
                        continue;
                    };
                    if target.0 == caller.id {
                        continue;
                    }
                    pending.push((caller.id.clone(), target.0, target.1));
                }
            }
        }

        for (from, to, confidence) in pending {
            if !self.nodes.contains_key(&to) {
                continue;
            }
            if let Some(node) = self.nodes.get_mut(&from) {
                node.out_edges.push(to.clone());
                let entry = node.out_edge_confidence.entry(to.clone()).or_insert(confidence);
                *entry = entry.merge(confidence);
            }
            if let Some(node) = self.nodes.get_mut(&to) {
                node.in_edges.push(from);
            }
        }
    }

    fn finalize(&mut self) {
        for node in self.nodes.values_mut() {
            node.out_edges.sort();
            node.out_edges.dedup();
            node.in_edges.sort();
            node.in_edges.dedup();
            let retained = node.out_edges.clone();
            node.out_edge_confidence.retain(|k, _| retained.contains(k));
        }
    }

    fn page_rank(&mut self, iterations: usize, damping: f64) {
        let n = self.nodes.len();
        if n == 0 {
            return;
        }
        let ids: Vec<String> = self.nodes.keys().cloned().collect();
        let out_degree: BTreeMap<String, usize> = ids
            .iter()
            .map(|id| (id.clone(), self.nodes[id].out_edges.len()))
            .collect();

        let mut scores: BTreeMap<String, f64> =
            ids.iter().map(|id| (id.clone(), 1.0 / n as f64)).collect();

        for _ in 0..iterations {
            let mut next: BTreeMap<String, f64> = ids
                .iter()
                .map(|id| (id.clone(), (1.0 - damping) / n as f64))
                .collect();

            for id in &ids {
                let degree = out_degree[id];
                if degree == 0 {
                    continue;
                }
                let share = damping * scores[id] / degree as f64;
                for target in &self.nodes[id].out_edges {
                    if let Some(v) = next.get_mut(target) {
                        *v += share;
                    }
                }
            }

            scores = next;
        }

        for (id, score) in scores {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.page_rank = score;
            }
        }
    }
}

fn top_level_dir(path: &str) -> &str {
    match path.find('/') {
        Some(idx) => &path[..idx],
        None => ".",
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_call(
    call: &crate::symbol::CallSite,
    file: &FileSymbols,
    caller_is_method: bool,
    method_names: &[&str],
    file_names: &[&str],
    by_path: &BTreeMap<&str, &FileSymbols>,
    set: &[FileSymbols],
    top_dir: &str,
) -> Option<(String, Confidence)> {
    // a. receiver-scoped
    if call.receiver.is_some() {
        if caller_is_method {
            if let Some(id) = unique_id_by_name(file, call.name.as_str(), Some(SymbolKind::Method)) {
                return Some((id, Confidence::Resolved));
            }
        }
        if let Some(id) = unique_id_by_name(file, &call.name, None) {
            return Some((id, Confidence::Resolved));
        }
        let _ = method_names;
        return None;
    }

    // b. same-file
    if file_names.iter().filter(|n| **n == call.name).count() == 1 {
        if let Some(id) = unique_id_by_name(file, &call.name, None) {
            return Some((id, Confidence::Resolved));
        }
    }

    // c. import-alias scoped (dotted access, e.g. `mod.helper()`)
    let primary = crate::parsing::common::strip_receiver_prefix(&call.qualifier);
    let primary = primary.split('.').next().unwrap_or("").to_string();
    if !primary.is_empty() {
        if let Some(target_path) = file.import_aliases.get(&primary) {
            if let Some(candidate) = resolve_alias_target(file, target_path, by_path) {
                if let Some(id) = unique_id_by_name(candidate, &call.name, None) {
                    return Some((id, Confidence::Heuristic));
                }
            }
            // d. qualifier present but did not yield a unique target
            return None;
        }
        // d. qualifier present, no matching alias at all
        return None;
    }

    // c. import-alias scoped (bare call through a named-import binding,
    // e.g. `import {helper as h} from "./util"` then `h()`)
    if let Some(target_path) = file.import_aliases.get(&call.name) {
        let lookup_name = target_path.split('#').nth(1).unwrap_or(&call.name);
        if let Some(candidate) = resolve_alias_target(file, target_path, by_path) {
            if let Some(id) = unique_id_by_name(candidate, lookup_name, None) {
                return Some((id, Confidence::Heuristic));
            }
        }
        // d. the call names an import binding that didn't resolve
        return None;
    }

    // e. module-scoped
    let same_dir: Vec<&FileSymbols> = set
        .iter()
        .filter(|f| top_level_dir(&f.path) == top_dir)
        .collect();
    if let Some(id) = unique_id_across(&same_dir, &call.name) {
        return Some((id, Confidence::Heuristic));
    }

    // f. global
    let all: Vec<&FileSymbols> = set.iter().collect();
    if let Some(id) = unique_id_across(&all, &call.name) {
        return Some((id, Confidence::Heuristic));
    }

    None
}

fn unique_id_by_name(file: &FileSymbols, name: &str, kind: Option<SymbolKind>) -> Option<String> {
    let mut matches = file
        .symbols
        .iter()
        .filter(|s| s.name == name && kind.map(|k| s.kind == k).unwrap_or(true));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.id.clone())
}

fn unique_id_across(files: &[&FileSymbols], name: &str) -> Option<String> {
    let mut found: Option<&str> = None;
    for file in files {
        for symbol in &file.symbols {
            if symbol.name == name {
                if found.is_some() {
                    return None;
                }
                found = Some(symbol.id.as_str());
            }
        }
    }
    found.map(|s| s.to_string())
}

fn resolve_alias_target<'a>(
    source: &FileSymbols,
    target: &str,
    by_path: &BTreeMap<&'a str, &'a FileSymbols>,
) -> Option<&'a FileSymbols> {
    let module = target.split('#').next().unwrap_or(target);

    if let Some(rel) = module.strip_prefix("./").or_else(|| module.strip_prefix("../")) {
        let _ = rel;
        let dir = source.path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        let joined = join_relative(dir, module);
        return find_by_extensionless(by_path, &joined);
    }

    find_by_extensionless(by_path, module)
        .or_else(|| find_by_directory_or_base(by_path, module))
}

fn join_relative(dir: &str, module: &str) -> String {
    let mut parts: Vec<&str> = if dir.is_empty() { Vec::new() } else { dir.split('/').collect() };
    for segment in module.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn find_by_extensionless<'a>(by_path: &BTreeMap<&'a str, &'a FileSymbols>, target: &str) -> Option<&'a FileSymbols> {
    by_path.iter().find_map(|(path, file)| {
        let stem = path.rsplit_once('.').map(|(s, _)| s).unwrap_or(path);
        if stem == target || *path == target {
            Some(*file)
        } else {
            None
        }
    })
}

fn find_by_directory_or_base<'a>(by_path: &BTreeMap<&'a str, &'a FileSymbols>, target: &str) -> Option<&'a FileSymbols> {
    let base = target.rsplit('/').next().unwrap_or(target);
    by_path.iter().find_map(|(path, file)| {
        let stem = path.rsplit_once('.').map(|(s, _)| s).unwrap_or(path);
        let path_base = stem.rsplit('/').next().unwrap_or(stem);
        if path_base == base || stem.ends_with(&format!("/{base}")) {
            Some(*file)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{CallSite, Symbol, SymbolKind};
    use crate::parsing::Language;
    use std::collections::BTreeMap as Map;

    fn file(path: &str, symbols: Vec<Symbol>) -> FileSymbols {
        FileSymbols {
            path: path.to_string(),
            language: Language::Python,
            hash: "h".to_string(),
            symbols,
            imports: Vec::new(),
            import_aliases: Map::new(),
        }
    }

    fn sym(id: &str, name: &str, kind: SymbolKind, calls: Vec<CallSite>) -> Symbol {
        Symbol {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            signature: String::new(),
            line: 1,
            doc: None,
            calls,
        }
    }

    fn call(name: &str, qualifier: &str, receiver: Option<&str>) -> CallSite {
        CallSite {
            name: name.to_string(),
            qualifier: qualifier.to_string(),
            receiver: receiver.map(|s| s.to_string()),
            arity: 0,
            line: 2,
            raw: name.to_string(),
        }
    }

    #[test]
    fn same_file_resolution_is_resolved() {
        let files = vec![file(
            "a.py",
            vec![
                sym("a.py|1|function|a", "a", SymbolKind::Function, vec![call("b", "", None)]),
                sym("a.py|2|function|b", "b", SymbolKind::Function, vec![]),
            ],
        )];
        let graph = Graph::build(&files);
        let a = &graph.nodes["a.py|1|function|a"];
        assert_eq!(a.out_edges, vec!["a.py|2|function|b".to_string()]);
        assert_eq!(a.out_edge_confidence["a.py|2|function|b"], Confidence::Resolved);
    }

    #[test]
    fn self_edges_are_dropped() {
        let files = vec![file(
            "a.py",
            vec![sym(
                "a.py|1|function|a",
                "a",
                SymbolKind::Function,
                vec![call("a", "", None)],
            )],
        )];
        let graph = Graph::build(&files);
        assert!(graph.nodes["a.py|1|function|a"].out_edges.is_empty());
    }

    #[test]
    fn ambiguous_same_name_in_two_files_is_unresolved() {
        let files = vec![
            file(
                "a.py",
                vec![sym("a.py|1|function|a", "a", SymbolKind::Function, vec![call("b", "", None)])],
            ),
            file("b.py", vec![sym("b.py|1|function|b", "b", SymbolKind::Function, vec![])]),
            file("c.py", vec![sym("c.py|1|function|b", "b", SymbolKind::Function, vec![])]),
        ];
        let graph = Graph::build(&files);
        assert!(graph.nodes["a.py|1|function|a"].out_edges.is_empty());
    }

    #[test]
    fn bare_call_resolves_through_named_import_alias() {
        let mut main = file(
            "api/main.ts",
            vec![sym("api/main.ts|2|function|run", "run", SymbolKind::Function, vec![call("h", "", None)])],
        );
        main.import_aliases.insert("h".to_string(), "./util#helper".to_string());

        let util = file(
            "api/util.ts",
            vec![sym("api/util.ts|1|function|helper", "helper", SymbolKind::Function, vec![])],
        );
        let other_util = file(
            "other/util.ts",
            vec![sym("other/util.ts|1|function|helper", "helper", SymbolKind::Function, vec![])],
        );

        let graph = Graph::build(&[main, util, other_util]);
        let run = &graph.nodes["api/main.ts|2|function|run"];
        assert_eq!(run.out_edges, vec!["api/util.ts|1|function|helper".to_string()]);
        assert_eq!(run.out_edge_confidence["api/util.ts|1|function|helper"], Confidence::Heuristic);
    }

    #[test]
    fn pagerank_scores_sum_near_one() {
        let files = vec![file(
            "a.py",
            vec![
                sym("a.py|1|function|a", "a", SymbolKind::Function, vec![call("b", "", None)]),
                sym("a.py|2|function|b", "b", SymbolKind::Function, vec![]),
            ],
        )];
        let graph = Graph::build(&files);
        let total: f64 = graph.nodes.values().map(|n| n.page_rank).sum();
        assert!((total - 1.0).abs() < 0.05);
    }
}
