//! Pipeline orchestration (component C11): `generate`, `update`,
//! `status`, and `doctor`, plus the `init` scaffolding step the CLI
//! exposes ahead of the first `generate`.

use crate::config::Settings;
use crate::error::{SkellyError, SkellyResult};
use crate::graph::Graph;
use crate::hash::hash_bytes;
use crate::ignore_match::IgnoreMatcher;
use crate::nav::NavIndex;
use crate::output::atomic::write_if_changed;
use crate::output::{write_artifacts, OutputFormat};
use crate::parsing::registry::Registry;
use crate::parsing::{FileSymbols, Issue};
use crate::search::SearchIndex;
use crate::state::{ImpactEntry, State, StateLoadError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::warn;

const STATE_FILE: &str = ".state.json";
const NAV_FILE: &str = "nav-index.json";
const SEARCH_FILE: &str = "search-index.json";

#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub files_parsed: usize,
    pub symbols: usize,
    pub issues: Vec<String>,
    pub artifacts_written: usize,
    pub artifacts_total: usize,
}

/// Scaffold the context directory: creates `<root>/<context_dir>/` and
/// its `.context` artifact subdirectory if absent. Idempotent.
pub fn init(root: &Path, settings: &Settings) -> SkellyResult<()> {
    let artifacts = settings.artifacts_path(root);
    std::fs::create_dir_all(&artifacts).map_err(|e| SkellyError::FileWrite { path: artifacts, source: e })?;
    Ok(())
}

fn read_ignore(root: &Path) -> IgnoreMatcher {
    let path = root.join(".skellyignore");
    let text = std::fs::read_to_string(path).unwrap_or_default();
    IgnoreMatcher::new(&text)
}

fn load_state(settings: &Settings, root: &Path) -> Option<State> {
    let path = settings.artifacts_path(root).join(STATE_FILE);
    let text = std::fs::read_to_string(&path).ok()?;
    match State::from_json(&text) {
        Ok(state) => Some(state),
        Err(StateLoadError::Corrupt(reason)) => {
            warn!(path = %path.display(), reason, "state file is corrupt; falling back to regenerate");
            None
        }
        Err(StateLoadError::VersionMismatch { .. }) => {
            warn!(path = %path.display(), "state version mismatch; falling back to regenerate");
            None
        }
    }
}

fn save_state(settings: &Settings, root: &Path, state: &State) -> SkellyResult<()> {
    let path = settings.artifacts_path(root).join(STATE_FILE);
    let json = state
        .to_json_pretty()
        .map_err(|e| SkellyError::General(format!("failed to encode state: {e}")))?;
    write_if_changed(&path, json.as_bytes()).map_err(|e| SkellyError::FileWrite { path, source: e })?;
    Ok(())
}

fn save_derived_indices(settings: &Settings, root: &Path, graph: &Graph) -> SkellyResult<()> {
    let artifacts = settings.artifacts_path(root);
    let nav = NavIndex::build(graph);
    let nav_json = serde_json::to_string_pretty(&nav)
        .map_err(|e| SkellyError::General(format!("failed to encode nav index: {e}")))?;
    let nav_path = artifacts.join(NAV_FILE);
    write_if_changed(&nav_path, nav_json.as_bytes()).map_err(|e| SkellyError::FileWrite { path: nav_path, source: e })?;

    let search = SearchIndex::build(graph);
    let search_json = serde_json::to_string_pretty(&search)
        .map_err(|e| SkellyError::General(format!("failed to encode search index: {e}")))?;
    let search_path = artifacts.join(SEARCH_FILE);
    write_if_changed(&search_path, search_json.as_bytes()).map_err(|e| SkellyError::FileWrite { path: search_path, source: e })?;

    Ok(())
}

fn filter_by_language(files: Vec<FileSymbols>, filter: Option<&str>) -> Vec<FileSymbols> {
    let Some(names) = filter else { return files };
    let wanted: Vec<crate::parsing::Language> =
        names.split(',').filter_map(|n| n.trim().parse().ok()).collect();
    if wanted.is_empty() {
        return files;
    }
    files.into_iter().filter(|f| wanted.contains(&f.language)).collect()
}

/// walk + parse → graph → outputs → nav + search → persist state.
///
/// Mirrors `update()`'s change detection even on a full walk: only
/// files whose content hash actually changed get a fresh `updated_at`
/// stamp, so a repeat run with no source changes produces a
/// byte-identical `.state.json`.
pub fn generate(root: &Path, settings: &Settings, filter: Option<&str>, format: OutputFormat) -> SkellyResult<RunReport> {
    init(root, settings)?;
    let artifacts = settings.artifacts_path(root);

    let prior_state = load_state(settings, root).unwrap_or_default();
    let prior_output_hashes = prior_state.output_hashes.clone();

    let ignore = read_ignore(root);
    let registry = Registry::default();
    let (mut files, issues) = registry.walk(root, &ignore);
    files = filter_by_language(files, filter);

    let current_hashes: BTreeMap<String, String> = files.iter().map(|f| (f.path.clone(), f.hash.clone())).collect();
    let current_paths: BTreeSet<String> = files.iter().map(|f| f.path.clone()).collect();
    let changed = prior_state.changed_files(&current_hashes);
    let deleted = prior_state.deleted_files(&current_paths);

    let graph = Graph::build(&files);

    let new_hashes = write_artifacts(&artifacts, &files, &graph, format)
        .map_err(|e| SkellyError::FileWrite { path: artifacts.clone(), source: e })?;
    save_derived_indices(settings, root, &graph)?;

    let mut state = prior_state;
    for path in &deleted {
        state.remove_file(path);
    }
    let now = now_placeholder();
    let file_map: BTreeMap<&str, &FileSymbols> = files.iter().map(|f| (f.path.as_str(), f)).collect();
    for path in &changed {
        if let Some(file) = file_map.get(path.as_str()) {
            state.upsert_file(file, &now);
        }
    }
    state.apply_graph_dependencies(&graph, None);
    state.output_hashes = new_hashes.clone();
    save_state(settings, root, &state)?;

    let rewritten = new_hashes.iter().filter(|(k, v)| prior_output_hashes.get(*k) != Some(v)).count();

    Ok(RunReport {
        files_parsed: files.len(),
        symbols: files.iter().map(|f| f.symbols.len()).sum(),
        issues: issues.iter().map(format_issue).collect(),
        artifacts_written: rewritten,
        artifacts_total: new_hashes.len(),
    })
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateReport {
    pub changed: Vec<String>,
    pub deleted: Vec<String>,
    pub impact: Vec<ImpactEntryView>,
    pub artifacts_written: usize,
    pub artifacts_total: usize,
    pub regenerated: bool,
}

#[derive(Debug, Serialize)]
pub struct ImpactEntryView {
    pub file: String,
    pub reason: String,
}

impl From<ImpactEntry> for ImpactEntryView {
    fn from(e: ImpactEntry) -> Self {
        Self { file: e.file, reason: e.reason }
    }
}

fn impact_view(impact: Vec<ImpactEntry>, explain: bool) -> Vec<ImpactEntryView> {
    if explain {
        impact.into_iter().map(Into::into).collect()
    } else {
        Vec::new()
    }
}

/// Load state; delegate to `generate` when absent/corrupt/mismatched.
/// Otherwise re-parse only changed files, remove deleted ones, compute
/// the impacted closure, rebuild a partial graph to refresh per-file
/// dependencies, then build the full graph from the merged snapshot
/// and write outputs.
pub fn update(root: &Path, settings: &Settings, format: OutputFormat, explain: bool) -> SkellyResult<UpdateReport> {
    let Some(mut state) = load_state(settings, root) else {
        let report = generate(root, settings, None, format)?;
        return Ok(UpdateReport {
            artifacts_written: report.artifacts_written,
            artifacts_total: report.artifacts_total,
            regenerated: true,
            ..Default::default()
        });
    };

    let ignore = read_ignore(root);
    let registry = Registry::default();
    let (current_files, issues) = registry.walk(root, &ignore);
    for issue in &issues {
        warn!(file = %issue.file, "{}", issue.message);
    }

    let current_hashes: BTreeMap<String, String> = current_files.iter().map(|f| (f.path.clone(), f.hash.clone())).collect();
    let current_paths: BTreeSet<String> = current_files.iter().map(|f| f.path.clone()).collect();

    let changed = state.changed_files(&current_hashes);
    let deleted = state.deleted_files(&current_paths);

    let artifacts = settings.artifacts_path(root);
    let missing_artifacts = !all_expected_artifacts_present(&artifacts, format);

    if changed.is_empty() && deleted.is_empty() && !missing_artifacts {
        return Ok(UpdateReport { regenerated: false, ..Default::default() });
    }

    let impact = state.impact_with_reasons(&changed, &deleted);

    if changed.is_empty() && deleted.is_empty() && missing_artifacts {
        let files = state.to_file_symbols();
        let graph = Graph::build(&files);
        let new_hashes = write_artifacts(&artifacts, &files, &graph, format)
            .map_err(|e| SkellyError::FileWrite { path: artifacts.clone(), source: e })?;
        save_derived_indices(settings, root, &graph)?;
        let rewritten = new_hashes.iter().filter(|(k, v)| state.output_hashes.get(*k) != Some(v)).count();
        state.output_hashes = new_hashes.clone();
        save_state(settings, root, &state)?;
        return Ok(UpdateReport {
            impact: impact_view(impact, explain),
            artifacts_written: rewritten,
            artifacts_total: new_hashes.len(),
            regenerated: false,
            ..Default::default()
        });
    }

    let now = now_placeholder();
    for path in &deleted {
        state.remove_file(path);
    }
    let changed_map: BTreeMap<&str, &FileSymbols> = current_files.iter().map(|f| (f.path.as_str(), f)).collect();
    for path in &changed {
        if let Some(file) = changed_map.get(path.as_str()) {
            state.upsert_file(file, &now);
        }
    }

    let impacted_paths: BTreeSet<String> = impact.iter().map(|e| e.file.clone()).collect();
    let impacted_files: Vec<FileSymbols> = state
        .to_file_symbols()
        .into_iter()
        .filter(|f| impacted_paths.contains(&f.path))
        .collect();
    if !impacted_files.is_empty() {
        let partial = Graph::build_partial(&impacted_files);
        state.apply_graph_dependencies(&partial, Some(&impacted_paths));
    }

    let all_files = state.to_file_symbols();
    let graph = Graph::build(&all_files);
    state.apply_graph_dependencies(&graph, None);

    let new_hashes = write_artifacts(&artifacts, &all_files, &graph, format)
        .map_err(|e| SkellyError::FileWrite { path: artifacts.clone(), source: e })?;
    save_derived_indices(settings, root, &graph)?;
    let rewritten = new_hashes.iter().filter(|(k, v)| state.output_hashes.get(*k) != Some(v)).count();
    state.output_hashes = new_hashes.clone();
    save_state(settings, root, &state)?;

    Ok(UpdateReport {
        changed: changed.into_iter().collect(),
        deleted: deleted.into_iter().collect(),
        impact: impact_view(impact, explain),
        artifacts_written: rewritten,
        artifacts_total: new_hashes.len(),
        regenerated: false,
    })
}

fn all_expected_artifacts_present(artifacts: &Path, format: OutputFormat) -> bool {
    let expected: &[&str] = match format {
        OutputFormat::Text => &["index.txt", "graph.txt"],
        OutputFormat::Jsonl => &["symbols.jsonl", "edges.jsonl", "manifest.json"],
    };
    expected.iter().all(|name| artifacts.join(name).exists())
        && artifacts.join(NAV_FILE).exists()
        && artifacts.join(SEARCH_FILE).exists()
}

#[derive(Debug, Default, Serialize)]
pub struct StatusReport {
    pub changed: Vec<String>,
    pub deleted: Vec<String>,
    pub impact: Vec<ImpactEntryView>,
    pub state_present: bool,
}

/// Identical scanning to `update`, writes nothing.
pub fn status(root: &Path, settings: &Settings) -> SkellyResult<StatusReport> {
    let Some(state) = load_state(settings, root) else {
        return Ok(StatusReport { state_present: false, ..Default::default() });
    };

    let ignore = read_ignore(root);
    let registry = Registry::default();
    let (current_files, _issues) = registry.walk(root, &ignore);

    let current_hashes: BTreeMap<String, String> = current_files.iter().map(|f| (f.path.clone(), f.hash.clone())).collect();
    let current_paths: BTreeSet<String> = current_files.iter().map(|f| f.path.clone()).collect();

    let changed = state.changed_files(&current_hashes);
    let deleted = state.deleted_files(&current_paths);
    let impact = state.impact_with_reasons(&changed, &deleted);

    Ok(StatusReport {
        changed: changed.into_iter().collect(),
        deleted: deleted.into_iter().collect(),
        impact: impact.into_iter().map(Into::into).collect(),
        state_present: true,
    })
}

#[derive(Debug, Default, Serialize)]
pub struct DoctorReport {
    pub context_dir_exists: bool,
    pub format_detected: Option<String>,
    pub state_present: bool,
    pub stale_files: usize,
    pub integrations: Vec<String>,
    pub language_servers: BTreeMap<String, bool>,
}

/// Reports context-directory format detection, state presence,
/// staleness counts, integration file presence, and language-server
/// availability per detected language.
pub fn doctor(root: &Path, settings: &Settings) -> SkellyResult<DoctorReport> {
    let context_dir = settings.context_path(root);
    let artifacts = settings.artifacts_path(root);
    let context_dir_exists = context_dir.exists();

    let format_detected = if artifacts.join("symbols.jsonl").exists() {
        Some("jsonl".to_string())
    } else if artifacts.join("index.txt").exists() {
        Some("text".to_string())
    } else {
        None
    };

    let state = load_state(settings, root);
    let state_present = state.is_some();

    let stale_files = match &state {
        Some(state) => {
            let ignore = read_ignore(root);
            let registry = Registry::default();
            let (current_files, _) = registry.walk(root, &ignore);
            let current_hashes: BTreeMap<String, String> =
                current_files.iter().map(|f| (f.path.clone(), f.hash.clone())).collect();
            state.changed_files(&current_hashes).len()
        }
        None => 0,
    };

    let mut integrations = Vec::new();
    for candidate in ["AGENTS.md", "CLAUDE.md", ".git/hooks/pre-commit", ".context/enrich.jsonl"] {
        if context_dir.join(candidate).exists() || root.join(candidate).exists() {
            integrations.push(candidate.to_string());
        }
    }
    for name in ["AGENTS.md", "CLAUDE.md"] {
        if let Ok(content) = std::fs::read_to_string(root.join(name)) {
            if crate::integrations::markdown::has_managed_block(&content) {
                integrations.push(format!("{name} (managed block)"));
            }
        }
    }

    let mut language_servers = BTreeMap::new();
    for (lang, binaries) in [
        ("go", &["gopls"][..]),
        ("python", &["pyright", "pylsp"][..]),
        ("ruby", &["solargraph"][..]),
        ("typescript", &["typescript-language-server"][..]),
        ("javascript", &["typescript-language-server"][..]),
    ] {
        let found = binaries.iter().any(|b| which(b));
        language_servers.insert(lang.to_string(), found);
    }

    Ok(DoctorReport {
        context_dir_exists,
        format_detected,
        state_present,
        stale_files,
        integrations,
        language_servers,
    })
}

fn which(binary: &str) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else { return false };
    std::env::split_paths(&path_var).any(|dir| dir.join(binary).is_file())
}

fn format_issue(issue: &Issue) -> String {
    format!("{:?} {} {}: {}", issue.severity, issue.file, issue.language.map(|l| l.as_str()).unwrap_or("?"), issue.message)
}

fn now_placeholder() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn setup_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("a.go")).unwrap();
        writeln!(f, "package d\nfunc A(){{ B() }}\nfunc B(){{}}\n").unwrap();
        dir
    }

    #[test]
    fn generate_then_update_with_no_changes_skips_rewrite() {
        let dir = setup_repo();
        let settings = Settings::default();
        let report = generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
        assert_eq!(report.files_parsed, 1);
        assert!(report.artifacts_written > 0);

        let update_report = update(dir.path(), &settings, OutputFormat::Text, false).unwrap();
        assert!(update_report.changed.is_empty());
        assert!(update_report.deleted.is_empty());
        assert_eq!(update_report.artifacts_written, 0);
    }

    #[test]
    fn update_picks_up_changed_file() {
        let dir = setup_repo();
        let settings = Settings::default();
        generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();

        let mut f = std::fs::File::create(dir.path().join("a.go")).unwrap();
        writeln!(f, "package d\nfunc A(){{ B() }}\nfunc B(){{}}\nfunc C(){{}}\n").unwrap();

        let update_report = update(dir.path(), &settings, OutputFormat::Text, true).unwrap();
        assert_eq!(update_report.changed, vec!["a.go".to_string()]);
    }

    #[test]
    fn status_reports_without_writing() {
        let dir = setup_repo();
        let settings = Settings::default();
        generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
        let before = std::fs::read(settings.artifacts_path(dir.path()).join("index.txt")).unwrap();

        let mut f = std::fs::File::create(dir.path().join("a.go")).unwrap();
        writeln!(f, "package d\nfunc A(){{}}\n").unwrap();

        let status_report = status(dir.path(), &settings).unwrap();
        assert_eq!(status_report.changed, vec!["a.go".to_string()]);
        let after = std::fs::read(settings.artifacts_path(dir.path()).join("index.txt")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn doctor_detects_text_format_and_state() {
        let dir = setup_repo();
        let settings = Settings::default();
        generate(dir.path(), &settings, None, OutputFormat::Text).unwrap();
        let report = doctor(dir.path(), &settings).unwrap();
        assert!(report.state_present);
        assert_eq!(report.format_detected.as_deref(), Some("text"));
    }
}
