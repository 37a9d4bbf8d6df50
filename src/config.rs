//! Layered configuration (ambient stack; SPEC_FULL §2.3).
//!
//! Layer order: built-in defaults → optional `.skelly.toml` at the repo
//! root → `SKELLY_`-prefixed environment variables → CLI overrides
//! applied by the caller after [`Settings::load`] returns. None of this
//! changes the algorithms in spec §4 — it only controls where the
//! context directory lives, which output format is the default, and
//! how much parallelism the parse stage uses.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory name under the repo root hosting `.context/` artifacts
    /// and `.state.json`. Default `.skelly`.
    #[serde(default = "default_context_dir")]
    pub context_dir: String,

    /// Default output format when a command doesn't specify one.
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Worker threads used for the parallel parse stage (C5).
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Default fuzzy-search result limit.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Default `trace` depth when not specified on the CLI.
    #[serde(default = "default_trace_depth")]
    pub trace_depth: usize,
}

fn default_context_dir() -> String {
    ".skelly".to_string()
}
fn default_format() -> String {
    "text".to_string()
}
fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
fn default_search_limit() -> usize {
    10
}
fn default_trace_depth() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            context_dir: default_context_dir(),
            default_format: default_format(),
            threads: default_threads(),
            search_limit: default_search_limit(),
            trace_depth: default_trace_depth(),
        }
    }
}

impl Settings {
    /// Load settings layered over `<root>/.skelly.toml` and
    /// `SKELLY_*` environment variables.
    pub fn load(root: &std::path::Path) -> figment::error::Result<Self> {
        let toml_path = root.join(".skelly.toml");
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("SKELLY_"))
            .extract()
    }

    /// The context directory under `root` (`<root>/<context_dir>`).
    pub fn context_path(&self, root: &std::path::Path) -> std::path::PathBuf {
        root.join(&self.context_dir)
    }

    /// The `.context` artifact directory
    /// (`<root>/<context_dir>/.context`).
    pub fn artifacts_path(&self, root: &std::path::Path) -> std::path::PathBuf {
        self.context_path(root).join(".context")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default();
        assert_eq!(s.context_dir, ".skelly");
        assert_eq!(s.default_format, "text");
        assert!(s.threads >= 1);
    }

    #[test]
    fn artifact_path_nests_under_context_dir() {
        let s = Settings::default();
        let root = std::path::Path::new("/repo");
        assert_eq!(
            s.artifacts_path(root),
            std::path::PathBuf::from("/repo/.skelly/.context")
        );
    }
}
