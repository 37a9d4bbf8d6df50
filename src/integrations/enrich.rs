//! Enrich metadata persistence: append-only `{target, description,
//! updated_at}` records. The orchestrator only ever reads this file to
//! look up a target's latest description; it never interprets the
//! content semantically.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichRecord {
    pub target: String,
    pub description: String,
    pub updated_at: String,
}

pub fn append(path: &Path, record: &EnrichRecord) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(record).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(file, "{line}")
}

/// The latest record for `target`, scanning bottom-up (last write wins).
pub fn latest_for(path: &Path, target: &str) -> Option<EnrichRecord> {
    let text = std::fs::read_to_string(path).ok()?;
    text.lines()
        .rev()
        .filter_map(|line| serde_json::from_str::<EnrichRecord>(line).ok())
        .find(|r| r.target == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_read_latest_for_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enrich.jsonl");
        append(
            &path,
            &EnrichRecord { target: "a.go".to_string(), description: "first".to_string(), updated_at: "t0".to_string() },
        )
        .unwrap();
        append(
            &path,
            &EnrichRecord { target: "a.go".to_string(), description: "second".to_string(), updated_at: "t1".to_string() },
        )
        .unwrap();

        let latest = latest_for(&path, "a.go").unwrap();
        assert_eq!(latest.description, "second");
    }

    #[test]
    fn missing_target_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enrich.jsonl");
        append(
            &path,
            &EnrichRecord { target: "a.go".to_string(), description: "x".to_string(), updated_at: "t0".to_string() },
        )
        .unwrap();
        assert!(latest_for(&path, "b.go").is_none());
    }
}
