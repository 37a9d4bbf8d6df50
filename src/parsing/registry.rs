//! Parse registry (component C5): extension dispatch, directory walk,
//! and post-processing of each extractor's raw output into
//! [`FileSymbols`].

use super::go::GoExtractor;
use super::javascript::JavaScriptExtractor;
use super::python::PythonExtractor;
use super::ruby::RubyExtractor;
use super::typescript::TypeScriptExtractor;
use super::{Extractor, FileSymbols, Issue, Language, Severity};
use crate::hash::hash_bytes;
use crate::ignore_match::IgnoreMatcher;
use crate::symbol::{normalize_calls, stable_id};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Extension → extractor dispatch table, built once per walk.
pub struct Registry {
    extractors: Vec<Box<dyn Extractor>>,
    by_extension: BTreeMap<&'static str, usize>,
}

impl Default for Registry {
    fn default() -> Self {
        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(GoExtractor),
            Box::new(PythonExtractor),
            Box::new(RubyExtractor),
            Box::new(TypeScriptExtractor),
            Box::new(JavaScriptExtractor),
        ];
        let mut by_extension = BTreeMap::new();
        for (idx, extractor) in extractors.iter().enumerate() {
            for ext in extractor.extensions() {
                by_extension.insert(*ext, idx);
            }
        }
        Self { extractors, by_extension }
    }
}

impl Registry {
    pub fn language_for_extension(&self, ext: &str) -> Option<Language> {
        self.by_extension
            .get(ext)
            .map(|idx| self.extractors[*idx].language())
    }

    /// Walk `root`, honoring `ignore`, parsing every registered file.
    /// Discovery is sequential (directory I/O doesn't parallelize
    /// well); the read-and-parse step for each discovered file runs
    /// across a `rayon` thread pool, since tree-sitter parsing is pure
    /// CPU work with no shared state between files. Returns results
    /// sorted by path and issues sorted by `(file, message)`.
    pub fn walk(&self, root: &Path, ignore: &IgnoreMatcher) -> (Vec<FileSymbols>, Vec<Issue>) {
        let mut candidates: Vec<(std::path::PathBuf, String, usize)> = Vec::new();
        let mut issues = Vec::new();

        let walker = WalkDir::new(root).follow_links(false).into_iter();
        for entry in walker.filter_entry(|e| {
            let rel = e.path().strip_prefix(root).unwrap_or(e.path());
            if rel.as_os_str().is_empty() {
                return true;
            }
            !ignore.matches(&rel.to_string_lossy())
        }) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.display().to_string()).unwrap_or_default();
                    issues.push(Issue {
                        severity: Severity::Warning,
                        file: path,
                        language: None,
                        message: format!("walk error: {err}"),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let rel_str = rel.to_string_lossy().replace('\\', "/");
            if ignore.matches(&rel_str) {
                continue;
            }

            let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let Some(&idx) = self.by_extension.get(ext) else {
                continue;
            };

            candidates.push((entry.into_path(), rel_str, idx));
        }

        let (mut files, parse_issues): (Vec<FileSymbols>, Vec<Issue>) = candidates
            .par_iter()
            .map(|(path, rel_str, idx)| self.parse_one(path, rel_str, *idx))
            .fold(
                || (Vec::new(), Vec::new()),
                |(mut files, mut issues), (file, issue)| {
                    files.extend(file);
                    issues.extend(issue);
                    (files, issues)
                },
            )
            .reduce(
                || (Vec::new(), Vec::new()),
                |(mut files, mut issues), (more_files, more_issues)| {
                    files.extend(more_files);
                    issues.extend(more_issues);
                    (files, issues)
                },
            );

        issues.extend(parse_issues);

        files.sort_by(|a, b| a.path.cmp(&b.path));
        issues.sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.message.cmp(&b.message)));
        (files, issues)
    }

    fn parse_one(&self, path: &Path, rel_str: &str, idx: usize) -> (Option<FileSymbols>, Option<Issue>) {
        let extractor = &self.extractors[idx];

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(err) => {
                return (
                    None,
                    Some(Issue {
                        severity: Severity::Warning,
                        file: rel_str.to_string(),
                        language: Some(extractor.language()),
                        message: format!("read error: {err}"),
                    }),
                );
            }
        };
        let source = match String::from_utf8(bytes.clone()) {
            Ok(s) => s,
            Err(_) => {
                return (
                    None,
                    Some(Issue {
                        severity: Severity::Warning,
                        file: rel_str.to_string(),
                        language: Some(extractor.language()),
                        message: "file is not valid UTF-8".to_string(),
                    }),
                );
            }
        };

        match extractor.parse(rel_str, &source) {
            Ok(raw) => {
                warn_on_parse_warnings(rel_str, extractor.language());
                let mut symbols = raw.symbols;
                for symbol in &mut symbols {
                    symbol.calls = normalize_calls(std::mem::take(&mut symbol.calls));
                    symbol.id = stable_id(rel_str, symbol.line, symbol.kind, &symbol.name, &symbol.signature);
                }

                let mut imports = raw.imports;
                imports.retain(|s| !s.trim().is_empty());
                for s in &mut imports {
                    *s = s.trim().to_string();
                }
                imports.sort();
                imports.dedup();

                let mut import_aliases = BTreeMap::new();
                for (alias, target) in raw.import_aliases {
                    let alias = alias.trim().to_string();
                    let target = target.trim().to_string();
                    if alias.is_empty() || target.is_empty() {
                        continue;
                    }
                    import_aliases.insert(alias, target);
                }

                (
                    Some(FileSymbols {
                        path: rel_str.to_string(),
                        language: extractor.language(),
                        hash: hash_bytes(&bytes),
                        symbols,
                        imports,
                        import_aliases,
                    }),
                    None,
                )
            }
            Err(message) => (
                None,
                Some(Issue {
                    severity: Severity::Error,
                    file: rel_str.to_string(),
                    language: Some(extractor.language()),
                    message,
                }),
            ),
        }
    }
}

fn warn_on_parse_warnings(path: &str, language: Language) {
    tracing::trace!(file = path, language = %language, "parsed file");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn walks_and_parses_mixed_languages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        let mut f = std::fs::File::create(dir.path().join("pkg/a.go")).unwrap();
        writeln!(f, "package pkg\nfunc A(){{}}\n").unwrap();
        let mut f2 = std::fs::File::create(dir.path().join("b.py")).unwrap();
        writeln!(f2, "def b():\n    pass\n").unwrap();

        let registry = Registry::default();
        let ignore = IgnoreMatcher::new("");
        let (files, issues) = registry.walk(dir.path(), &ignore);
        assert!(issues.is_empty());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "b.py");
        assert_eq!(files[1].path, "pkg/a.go");
    }

    #[test]
    fn ignored_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/vendor.js"), "function v(){}\n").unwrap();
        std::fs::write(dir.path().join("main.js"), "function m(){}\n").unwrap();

        let registry = Registry::default();
        let ignore = IgnoreMatcher::new("");
        let (files, _) = registry.walk(dir.path(), &ignore);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "main.js");
    }

    #[test]
    fn unreadable_utf8_becomes_issue() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.py"), [0xff, 0xfe, 0x00, 0xff]).unwrap();

        let registry = Registry::default();
        let ignore = IgnoreMatcher::new("");
        let (files, issues) = registry.walk(dir.path(), &ignore);
        assert!(files.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
