//! Command-line surface (clap derive): a top-level `Cli` wrapping a
//! `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "skelly", version, about = "LLM-consumable code skeleton extractor")]
pub struct Cli {
    /// Repository root. Defaults to the current directory.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Emit debug-level logs.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold the context directory.
    Init,

    /// Full walk + parse + graph + artifact generation.
    Generate {
        /// Restrict to one language (go, python, ruby, typescript, javascript).
        #[arg(long)]
        lang: Option<String>,
        #[arg(long, default_value = "text")]
        format: String,
        #[arg(long)]
        json: bool,
    },

    /// Incremental re-parse of changed files.
    Update {
        #[arg(long, default_value = "text")]
        format: String,
        /// Include impact reasons even when nothing changed.
        #[arg(long)]
        explain: bool,
        #[arg(long)]
        json: bool,
    },

    /// Report changed/deleted files and impact without writing anything.
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Diagnose context-directory health and language-server availability.
    Doctor {
        #[arg(long)]
        json: bool,
    },

    /// Look up a symbol by ID or name.
    Symbol {
        query: String,
        #[arg(long)]
        fuzzy: bool,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },

    /// List callers of a symbol.
    Callers {
        query: String,
        #[arg(long)]
        json: bool,
    },

    /// List callees of a symbol.
    Callees {
        query: String,
        #[arg(long)]
        json: bool,
    },

    /// Breadth-first trace from a symbol up to a depth.
    Trace {
        query: String,
        #[arg(long, default_value_t = 3)]
        depth: u32,
        #[arg(long)]
        json: bool,
    },

    /// Shortest call path between two symbols.
    Path {
        from: String,
        to: String,
        #[arg(long)]
        json: bool,
    },

    /// Resolve a symbol specifier or file:line to its definition.
    Definition {
        query: String,
        #[arg(long)]
        json: bool,
    },

    /// Resolve a symbol specifier or file:line to its references.
    References {
        query: String,
        #[arg(long)]
        json: bool,
    },

    /// Append an enrich-metadata record for a target.
    Enrich {
        target: String,
        description: String,
        #[arg(long)]
        json: bool,
    },

    /// Install a git pre-commit hook that runs `skelly update`.
    InstallHook {
        #[arg(long)]
        force: bool,
    },

    /// Print version information.
    Version,
}
