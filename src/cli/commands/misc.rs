//! `enrich` / `install-hook` / `version` command handlers.

use crate::config::Settings;
use crate::error::{SkellyError, SkellyResult};
use crate::integrations::enrich::{self, EnrichRecord};
use crate::integrations::hook;
use crate::integrations::markdown;
use crate::output::atomic::write_if_changed;
use std::path::Path;

/// Adapter files whose managed block gets refreshed on every `enrich`.
const ADAPTER_FILES: &[&str] = &["AGENTS.md", "CLAUDE.md"];

pub fn enrich_cmd(root: &Path, settings: &Settings, target: &str, description: &str, json: bool) -> SkellyResult<()> {
    let path = settings.artifacts_path(root).join("enrich.jsonl");
    let record = EnrichRecord {
        target: target.to_string(),
        description: description.to_string(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    };
    enrich::append(&path, &record).map_err(|e| SkellyError::FileWrite { path, source: e })?;
    update_adapter_files(root, target, description)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record).unwrap_or_default());
    } else {
        println!("recorded enrichment for {target}");
    }
    Ok(())
}

/// Upsert the managed block in any adapter file present at `root` with
/// the latest enrichment for `target`.
fn update_adapter_files(root: &Path, target: &str, description: &str) -> SkellyResult<()> {
    let body = format!("`{target}`: {description}");
    for name in ADAPTER_FILES {
        let adapter_path = root.join(name);
        let Ok(existing) = std::fs::read_to_string(&adapter_path) else {
            continue;
        };
        let updated = markdown::upsert_block(&existing, &body);
        write_if_changed(&adapter_path, updated.as_bytes())
            .map_err(|e| SkellyError::FileWrite { path: adapter_path, source: e })?;
    }
    Ok(())
}

pub fn install_hook(root: &Path, force: bool) -> SkellyResult<()> {
    let git_dir = root.join(".git");
    if !git_dir.exists() {
        return Err(SkellyError::UnsupportedInput { reason: format!("{} is not a git repository", root.display()) });
    }
    let outcome = hook::install(&git_dir, force).map_err(|e| SkellyError::FileWrite { path: git_dir, source: e })?;
    match outcome {
        hook::InstallOutcome::Installed => println!("installed pre-commit hook"),
        hook::InstallOutcome::Skipped => println!("an existing pre-commit hook was left untouched; pass --force to replace it"),
    }
    Ok(())
}

pub fn version() {
    println!("skelly {}", env!("CARGO_PKG_VERSION"));
}
