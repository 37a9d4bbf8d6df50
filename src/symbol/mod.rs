//! Core data model: symbol kinds, call sites, symbols, and the stable
//! symbol identifier (component C1).
//!
//! IDs are computed once, before graph construction, and are reused
//! across runs whenever (path, line, kind, name, signature) are
//! unchanged — this is the reproducibility contract callers rely on
//! (spec §6, "Stable identifier contract").

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// A closed tag for the kind of a declared symbol.
///
/// The `Display` stringification is fixed and forms part of the stable
/// ID grammar (`file|line|kind|name[|sighash]`) — never rename a variant
/// without treating it as a breaking change to every persisted ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Module,
    Constant,
    Variable,
    TypeAlias,
}

impl SymbolKind {
    /// The fixed stringification used in stable IDs and on-disk artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Module => "module",
            SymbolKind::Constant => "constant",
            SymbolKind::Variable => "variable",
            SymbolKind::TypeAlias => "type-alias",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded call expression inside some symbol's body.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallSite {
    /// Callee name, non-empty after trim.
    pub name: String,
    /// Expression preceding a dot-access (receiver, module alias, chain
    /// prefix). Empty for bare calls.
    pub qualifier: String,
    /// Set to "self" / "this" / "cls" / an explicit receiver text when the
    /// qualifier indicates receiver-scoped dispatch.
    pub receiver: Option<String>,
    /// Named-argument count of the call arguments node.
    pub arity: usize,
    /// 1-based line of the call expression.
    pub line: u32,
    /// Trimmed textual form of the callee expression.
    pub raw: String,
}

impl CallSite {
    /// The dedup/sort key: (line, qualifier, name, receiver, raw).
    fn sort_key(&self) -> (u32, &str, &str, Option<&str>, &str) {
        (
            self.line,
            self.qualifier.as_str(),
            self.name.as_str(),
            self.receiver.as_deref(),
            self.raw.as_str(),
        )
    }
}

/// Sort call sites by (line, qualifier, name, receiver, raw) and drop
/// duplicates sharing that same tuple.
pub fn normalize_calls(mut calls: Vec<CallSite>) -> Vec<CallSite> {
    calls.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    calls.dedup_by(|a, b| a.sort_key() == b.sort_key());
    calls
}

/// A declared entity in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Stable identifier, see [`stable_id`].
    pub id: String,
    pub name: String,
    pub kind: SymbolKind,
    /// Language-specific normalized signature text.
    pub signature: String,
    /// 1-based declaration line.
    pub line: u32,
    /// First line of an adjacent docstring/doc comment, if any.
    pub doc: Option<String>,
    pub calls: Vec<CallSite>,
}

/// Compute the stable symbol identifier.
///
/// `file` must be a relative, forward-slash path. When `signature` is
/// empty the ID is `file|line|kind|name`; otherwise a `|h` suffix is
/// appended where `h` is the first 8 hex characters of the SHA-1 digest
/// of the signature bytes.
pub fn stable_id(file: &str, line: u32, kind: SymbolKind, name: &str, signature: &str) -> String {
    if signature.is_empty() {
        format!("{file}|{line}|{kind}|{name}")
    } else {
        let mut hasher = Sha1::new();
        hasher.update(signature.as_bytes());
        let digest = hasher.finalize();
        let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
        format!("{file}|{line}|{kind}|{name}|{}", &hex[..8])
    }
}
