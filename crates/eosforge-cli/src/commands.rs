use crate::{
    CliError,
    cli::{AccountsCommand, Command},
};
use eosforge_core::{
    Config, ConfigModel, Diagnostics,
    model::ObjectRegistry,
    workflow::template,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

pub fn execute(config: &ConfigModel, command: Command) -> Result<String, CliError> {
    let diag = Diagnostics::from_config(&config.log);

    match command {
        Command::New {
            project,
            template,
            remove_existing,
        } => {
            let dir = template::create_workspace(
                &config.templates,
                &project,
                template.as_deref(),
                remove_existing,
                &diag,
            )?;

            Ok(dir.display().to_string())
        }

        Command::Accounts { action } => {
            let registry = registry(config);

            match action {
                AccountsCommand::List { json } => {
                    let entries = registry.entries(&diag);
                    if json {
                        Ok(serde_json::to_string_pretty(&entries)?)
                    } else {
                        Ok(render_table(&entries))
                    }
                }
                AccountsCommand::Clear { keep } => {
                    let exclude: BTreeSet<String> =
                        registry.reserved().iter().cloned().chain(keep).collect();
                    let kept = registry.clear(&diag, &exclude)?;

                    Ok(format!("{} entries kept", kept.len()))
                }
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<ConfigModel, CliError> {
    Ok(Config::load(path)?)
}

fn registry(config: &ConfigModel) -> ObjectRegistry {
    ObjectRegistry::new(
        config.wallet.account_map_path(&config.node),
        config.bootstrap.reserved.clone(),
    )
}

fn render_table(entries: &BTreeMap<String, String>) -> String {
    let width = entries.keys().map(String::len).max().unwrap_or(0);

    entries
        .iter()
        .map(|(local, chain)| format!("{local:<width$}  {chain}"))
        .collect::<Vec<_>>()
        .join("\n")
}

///
/// TESTS
///
