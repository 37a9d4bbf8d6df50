//! Multi-language symbol and call-site extraction (component C4) plus
//! the parse registry (component C5).
//!
//! Each language extractor satisfies the same small capability set
//! described in spec §9 ("Polymorphism over parsers"): `language()`,
//! `extensions()`, and `parse(path, bytes) -> FileSymbols | issue`. The
//! tree-sitter grammars differ per language; that difference is hidden
//! behind the [`Extractor`] trait.

pub mod common;
pub mod ecma;
pub mod go;
pub mod javascript;
pub mod python;
pub mod registry;
pub mod ruby;
pub mod typescript;

use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    Go,
    Python,
    Ruby,
    TypeScript,
    JavaScript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Language::Go),
            "python" | "py" => Ok(Language::Python),
            "ruby" | "rb" => Ok(Language::Ruby),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "javascript" | "js" => Ok(Language::JavaScript),
            other => Err(format!("unknown language filter '{other}'")),
        }
    }
}

/// Per-file payload produced by an extractor and post-processed by the
/// registry (§3, "FileSymbols").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSymbols {
    /// Relative, forward-slash path.
    pub path: String,
    pub language: Language,
    pub hash: String,
    pub symbols: Vec<Symbol>,
    /// Deduped, sorted import targets.
    pub imports: Vec<String>,
    /// alias → target, where target is `module` or `module#symbol`.
    pub import_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal parse or walk failure (spec §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub file: String,
    pub language: Option<Language>,
    pub message: String,
}

/// Common interface for all language extractors (spec §9).
pub trait Extractor: Send + Sync {
    fn language(&self) -> Language;
    fn extensions(&self) -> &'static [&'static str];
    /// Parse one file's bytes into symbols, imports, and aliases. The
    /// `path` is the relative path already normalized to forward
    /// slashes; it is not re-hashed here — the registry attaches the
    /// content hash.
    fn parse(&self, path: &str, source: &str) -> Result<RawFile, String>;
}

/// What an extractor hands back before the registry's post-processing
/// (ID assignment, import dedup/sort, call-site normalization).
#[derive(Debug, Clone, Default)]
pub struct RawFile {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<String>,
    pub import_aliases: BTreeMap<String, String>,
}
