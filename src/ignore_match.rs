//! Gitignore-style path filter (component C3).
//!
//! Builds from a fixed default rule set, followed by user rules parsed
//! from a `.skellyignore` file. Verdict for a path is the sign of the
//! **last** rule that matches it — this is what makes negation
//! (`!pattern`) work as an override of an earlier broader exclude.

const DEFAULT_RULES: &[&str] = &[
    ".git/",
    ".skelly/",
    ".context/",
    "node_modules/",
    "vendor/",
    "dist/",
    "build/",
    "target/",
    "__pycache__/",
];

#[derive(Debug, Clone)]
struct Rule {
    /// Pattern split into `/`-separated components, sans leading `/`.
    components: Vec<String>,
    negate: bool,
    anchored: bool,
    dir_only: bool,
}

/// A compiled set of ignore rules.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    rules: Vec<Rule>,
}

impl IgnoreMatcher {
    /// Build a matcher from the fixed defaults plus the contents of a
    /// `.skellyignore` file (or `""` when the file is absent — a missing
    /// ignore file is not an error).
    pub fn new(user_rules_text: &str) -> Self {
        let mut rules = Vec::new();
        for raw in DEFAULT_RULES {
            if let Some(r) = parse_rule(raw) {
                rules.push(r);
            }
        }
        for line in user_rules_text.lines() {
            if let Some(r) = parse_rule(line) {
                rules.push(r);
            }
        }
        Self { rules }
    }

    /// Normalize a path: forward slashes, leading `./` or `/` stripped.
    pub fn normalize(path: &str) -> String {
        let p = path.replace('\\', "/");
        let p = p.strip_prefix("./").unwrap_or(&p);
        p.strip_prefix('/').unwrap_or(p).to_string()
    }

    /// True if `path` should be excluded: the sign of the last matching
    /// rule, or `false` (include) if no rule matches.
    pub fn matches(&self, path: &str) -> bool {
        let normalized = Self::normalize(path);
        let components: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        let mut verdict = false;
        for rule in &self.rules {
            if rule_matches(rule, &components) {
                verdict = !rule.negate;
            }
        }
        verdict
    }
}

fn parse_rule(line: &str) -> Option<Rule> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut pattern = trimmed;
    let negate = pattern.starts_with('!');
    if negate {
        pattern = &pattern[1..];
    }
    let anchored = pattern.starts_with('/');
    if anchored {
        pattern = &pattern[1..];
    }
    let dir_only = pattern.ends_with('/') && pattern.len() > 1;
    let pattern = pattern.strip_suffix('/').unwrap_or(pattern);
    if pattern.is_empty() {
        return None;
    }
    let components = pattern.split('/').map(|s| s.to_string()).collect();
    Some(Rule {
        components,
        negate,
        anchored,
        dir_only,
    })
}

fn rule_matches(rule: &Rule, path_components: &[&str]) -> bool {
    let pattern: Vec<&str> = if rule.anchored {
        rule.components.iter().map(|s| s.as_str()).collect()
    } else {
        std::iter::once("**")
            .chain(rule.components.iter().map(|s| s.as_str()))
            .collect()
    };

    if rule.dir_only {
        // Any ancestor directory (or the path itself) matching the
        // pattern drags every descendant in with it.
        (1..=path_components.len()).any(|k| match_segments(&pattern, &path_components[..k]))
    } else {
        match_segments(&pattern, path_components)
    }
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.first() {
        None => path.is_empty(),
        Some(&"**") => {
            // Zero or more path components.
            (0..=path.len()).any(|k| match_segments(&pattern[1..], &path[k..]))
        }
        Some(seg) => {
            if path.is_empty() {
                false
            } else {
                segment_match(seg, path[0]) && match_segments(&pattern[1..], &path[1..])
            }
        }
    }
}

/// Match a single path component against a pattern segment using `*`
/// (run of non-separator chars) and `?` (one non-separator char).
fn segment_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    segment_match_rec(&p, &t)
}

fn segment_match_rec(p: &[char], t: &[char]) -> bool {
    match p.first() {
        None => t.is_empty(),
        Some('*') => (0..=t.len()).any(|k| segment_match_rec(&p[1..], &t[k..])),
        Some('?') => !t.is_empty() && segment_match_rec(&p[1..], &t[1..]),
        Some(c) => !t.is_empty() && t[0] == *c && segment_match_rec(&p[1..], &t[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_match_nested_dirs() {
        let m = IgnoreMatcher::new("");
        assert!(m.matches("node_modules/lib/index.js"));
        assert!(m.matches("pkg/node_modules/lib/index.js"));
        assert!(m.matches(".git/HEAD"));
    }

    #[test]
    fn unrelated_paths_are_not_ignored() {
        let m = IgnoreMatcher::new("");
        assert!(!m.matches("src/main.go"));
    }

    #[test]
    fn negation_overrides_earlier_broader_rule() {
        let m = IgnoreMatcher::new("*.log\n!keep.log\n");
        assert!(m.matches("app.log"));
        assert!(!m.matches("keep.log"));
    }

    #[test]
    fn last_matching_rule_wins() {
        let m = IgnoreMatcher::new("docs/\n!docs/keep/\ndocs/keep/secret.md\n");
        assert!(m.matches("docs/readme.md"));
        assert!(!m.matches("docs/keep/guide.md"));
        assert!(m.matches("docs/keep/secret.md"));
    }

    #[test]
    fn anchored_rule_only_matches_root() {
        let m = IgnoreMatcher::new("/only_root.txt\n");
        assert!(m.matches("only_root.txt"));
        assert!(!m.matches("nested/only_root.txt"));
    }

    #[test]
    fn double_star_crosses_separators() {
        let m = IgnoreMatcher::new("src/**/generated.rs\n");
        assert!(m.matches("src/a/b/generated.rs"));
        assert!(m.matches("src/generated.rs"));
        assert!(!m.matches("src/a/b/generated.go"));
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let m = IgnoreMatcher::new("\n# comment\n  \n*.tmp\n");
        assert!(m.matches("scratch.tmp"));
    }

    #[test]
    fn normalize_strips_leading_dot_slash_and_slash() {
        assert_eq!(IgnoreMatcher::normalize("./a/b"), "a/b");
        assert_eq!(IgnoreMatcher::normalize("/a/b"), "a/b");
        assert_eq!(IgnoreMatcher::normalize("a/b"), "a/b");
    }
}
