//! Incremental state store (component C7): per-file snapshots,
//! change/impact detection, output-hash map, and version gates.

use crate::graph::Graph;
use crate::parsing::{FileSymbols, Language};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const STATE_VERSION: u32 = 1;
pub const PARSER_VERSION: u32 = 1;
pub const OUTPUT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileState {
    pub hash: String,
    pub language: Language,
    pub symbols: Vec<crate::symbol::Symbol>,
    pub imports: Vec<String>,
    pub import_aliases: BTreeMap<String, String>,
    pub dependencies: Vec<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub state_version: u32,
    pub parser_version: u32,
    pub output_version: u32,
    pub files: BTreeMap<String, FileState>,
    pub output_hashes: BTreeMap<String, String>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            state_version: STATE_VERSION,
            parser_version: PARSER_VERSION,
            output_version: OUTPUT_VERSION,
            files: BTreeMap::new(),
            output_hashes: BTreeMap::new(),
        }
    }
}

/// Why a file was pulled into an impact set (spec §4.C7).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImpactEntry {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StateLoadError {
    #[error("state file is corrupt: {0}")]
    Corrupt(String),
    #[error("state version mismatch: stored parser_version={stored_parser}, output_version={stored_output}")]
    VersionMismatch { stored_parser: u32, stored_output: u32 },
}

impl State {
    pub fn from_json(text: &str) -> Result<Self, StateLoadError> {
        let state: State = serde_json::from_str(text).map_err(|e| StateLoadError::Corrupt(e.to_string()))?;
        if state.parser_version != PARSER_VERSION || state.output_version != OUTPUT_VERSION {
            return Err(StateLoadError::VersionMismatch {
                stored_parser: state.parser_version,
                stored_output: state.output_version,
            });
        }
        Ok(state)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Files whose stored hash differs from (or is absent in) `current_hashes`.
    pub fn changed_files(&self, current_hashes: &BTreeMap<String, String>) -> BTreeSet<String> {
        current_hashes
            .iter()
            .filter(|(path, hash)| self.files.get(*path).map(|f| &f.hash) != Some(*hash))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Stored files no longer present in `current_file_set`.
    pub fn deleted_files(&self, current_file_set: &BTreeSet<String>) -> BTreeSet<String> {
        self.files
            .keys()
            .filter(|path| !current_file_set.contains(*path))
            .cloned()
            .collect()
    }

    /// Seed with changed/deleted files, propagate through reverse
    /// dependencies, then add files whose cached calls reference a
    /// symbol declared in a changed file.
    pub fn impact_with_reasons(&self, changed: &BTreeSet<String>, deleted: &BTreeSet<String>) -> Vec<ImpactEntry> {
        let mut reasons: BTreeMap<String, String> = BTreeMap::new();
        for f in changed {
            reasons.entry(f.clone()).or_insert_with(|| "changed".to_string());
        }
        for f in deleted {
            reasons.entry(f.clone()).or_insert_with(|| "deleted".to_string());
        }

        let mut reverse_deps: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (path, state) in &self.files {
            for dep in &state.dependencies {
                reverse_deps.entry(dep.as_str()).or_default().push(path.as_str());
            }
        }

        let mut frontier: Vec<String> = reasons.keys().cloned().collect();
        while let Some(f) = frontier.pop() {
            if let Some(dependents) = reverse_deps.get(f.as_str()) {
                for dependent in dependents {
                    if !reasons.contains_key(*dependent) {
                        reasons.insert(dependent.to_string(), format!("depends on {f}"));
                        frontier.push(dependent.to_string());
                    }
                }
            }
        }

        let mut changed_names: BTreeSet<&str> = BTreeSet::new();
        for f in changed {
            if let Some(state) = self.files.get(f) {
                changed_names.extend(state.symbols.iter().map(|s| s.name.as_str()));
            }
        }

        for (path, state) in &self.files {
            if reasons.contains_key(path) {
                continue;
            }
            let calls_changed = state
                .symbols
                .iter()
                .flat_map(|s| s.calls.iter())
                .find(|c| changed_names.contains(c.name.as_str()));
            if let Some(call) = calls_changed {
                reasons.insert(path.clone(), format!("calls changed symbol {}", call.name));
            }
        }

        reasons
            .into_iter()
            .map(|(file, reason)| ImpactEntry { file, reason })
            .collect()
    }

    /// For each target file (or every file when `targets` is absent),
    /// store the sorted set of other files any of its symbols resolves
    /// an outgoing edge into.
    pub fn apply_graph_dependencies(&mut self, graph: &Graph, targets: Option<&BTreeSet<String>>) {
        for (path, ids) in &graph.files {
            if let Some(targets) = targets {
                if !targets.contains(path) {
                    continue;
                }
            }
            let Some(state) = self.files.get_mut(path) else {
                continue;
            };
            let mut deps: BTreeSet<String> = BTreeSet::new();
            for id in ids {
                if let Some(node) = graph.nodes.get(id) {
                    for target_id in &node.out_edges {
                        if let Some(target_node) = graph.nodes.get(target_id) {
                            if target_node.file != *path {
                                deps.insert(target_node.file.clone());
                            }
                        }
                    }
                }
            }
            state.dependencies = deps.into_iter().collect();
        }
    }

    pub fn upsert_file(&mut self, file: &FileSymbols, updated_at: &str) {
        self.files.insert(
            file.path.clone(),
            FileState {
                hash: file.hash.clone(),
                language: file.language,
                symbols: file.symbols.clone(),
                imports: file.imports.clone(),
                import_aliases: file.import_aliases.clone(),
                dependencies: Vec::new(),
                updated_at: updated_at.to_string(),
            },
        );
    }

    pub fn remove_file(&mut self, path: &str) {
        self.files.remove(path);
    }

    /// Reconstruct [`FileSymbols`] for every stored file, for feeding
    /// a full graph rebuild from the merged snapshot.
    pub fn to_file_symbols(&self) -> Vec<FileSymbols> {
        self.files
            .iter()
            .map(|(path, state)| FileSymbols {
                path: path.clone(),
                language: state.language,
                hash: state.hash.clone(),
                symbols: state.symbols.clone(),
                imports: state.imports.clone(),
                import_aliases: state.import_aliases.clone(),
            })
            .collect()
    }
}
