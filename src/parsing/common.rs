//! Helpers shared by every language extractor: signature normalization,
//! docstring extraction, and small tree-sitter conveniences.

use crate::symbol::CallSite;
use tree_sitter::Node;

/// Build a [`CallSite`], applying the shared receiver rule: the
/// `receiver` field is set only when the qualifier is literally `self`,
/// `this`, or `cls` (spec §3, §9 open question on Ruby receivers).
pub fn make_call_site(qualifier: &str, name: &str, raw: &str, line: u32, arity: usize) -> CallSite {
    let receiver = match qualifier {
        "self" | "this" | "cls" => Some(qualifier.to_string()),
        _ => None,
    };
    CallSite {
        name: name.trim().to_string(),
        qualifier: qualifier.trim().to_string(),
        receiver,
        arity,
        line,
        raw: raw.trim().to_string(),
    }
}

/// Collapse internal whitespace/newlines to single spaces and trim.
/// Required for round-trip-stable signatures (spec §4.C4).
pub fn normalize_signature(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The source text spanned by `node`.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source
        .get(node.start_byte()..node.end_byte())
        .unwrap_or_default()
}

/// 1-based line of a node's start position.
pub fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

/// First non-empty line of a block/line comment or string literal,
/// with comment markers and quotes stripped.
pub fn first_doc_line(raw: &str) -> Option<String> {
    let stripped = raw
        .trim()
        .trim_start_matches("///")
        .trim_start_matches("//!")
        .trim_start_matches("//")
        .trim_start_matches("/**")
        .trim_start_matches("/*!")
        .trim_start_matches("/*")
        .trim_end_matches("*/")
        .trim_start_matches("#")
        .trim();

    let unquoted = strip_string_quotes(stripped);

    unquoted
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .find(|l| !l.is_empty())
        .map(|l| l.to_string())
}

fn strip_string_quotes(s: &str) -> &str {
    for q in ["\"\"\"", "'''", "\"", "'", "`"] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

/// Trim trailing arguments like `self.`/`this.` off a qualifier when
/// determining the primary import-alias-lookup key (spec §4.C6.c).
pub fn strip_receiver_prefix(qualifier: &str) -> &str {
    qualifier
        .strip_prefix("self.")
        .or_else(|| qualifier.strip_prefix("this."))
        .unwrap_or(qualifier)
}

/// Count named children of an `arguments`/`argument_list` node.
pub fn named_arg_count(args_node: Option<Node>) -> usize {
    args_node.map(|n| n.named_child_count()).unwrap_or(0)
}
