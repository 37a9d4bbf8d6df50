//! CLI driver: argument parsing and dispatch to orchestrator/nav/
//! search operations.

pub mod args;
pub mod commands;

use crate::config::Settings;
use crate::error::SkellyResult;
use args::{Cli, Commands};
use std::path::PathBuf;

pub fn run(cli: Cli) -> SkellyResult<()> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let settings = Settings::load(&root).unwrap_or_default();

    match cli.command {
        Commands::Init => commands::pipeline::init(&root, &settings),
        Commands::Generate { lang, format, json } => {
            commands::pipeline::generate(&root, &settings, lang.as_deref(), &format, json)
        }
        Commands::Update { format, explain, json } => commands::pipeline::update(&root, &settings, &format, explain, json),
        Commands::Status { json } => commands::pipeline::status(&root, &settings, json),
        Commands::Doctor { json } => commands::pipeline::doctor(&root, &settings, json),
        Commands::Symbol { query, fuzzy, limit, json } => {
            commands::query::symbol(&root, &settings, &query, fuzzy, limit, json)
        }
        Commands::Callers { query, json } => commands::query::callers(&root, &settings, &query, json),
        Commands::Callees { query, json } => commands::query::callees(&root, &settings, &query, json),
        Commands::Trace { query, depth, json } => commands::query::trace(&root, &settings, &query, depth, json),
        Commands::Path { from, to, json } => commands::query::path(&root, &settings, &from, &to, json),
        Commands::Definition { query, json } => commands::query::definition(&root, &settings, &query, json),
        Commands::References { query, json } => commands::query::references(&root, &settings, &query, json),
        Commands::Enrich { target, description, json } => {
            commands::misc::enrich_cmd(&root, &settings, &target, &description, json)
        }
        Commands::InstallHook { force } => commands::misc::install_hook(&root, force),
        Commands::Version => {
            commands::misc::version();
            Ok(())
        }
    }
}
