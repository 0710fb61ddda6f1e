use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "eosforge", about = "EOSIO contract workspaces and account maps", version)]
pub struct Cli {
    /// Configuration file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "eosforge.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a contract workspace from a template.
    New {
        project: String,
        template: Option<String>,
        #[arg(long)]
        remove_existing: bool,
    },

    /// Inspect or clear the local-name → chain-name map.
    Accounts {
        #[command(subcommand)]
        action: AccountsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    List {
        /// Print the map as JSON.
        #[arg(long)]
        json: bool,
    },
    Clear {
        /// Chain names to keep in addition to the reserved ones.
        #[arg(long = "keep")]
        keep: Vec<String>,
    },
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_takes_optional_template() {
        let cli = Cli::try_parse_from(["eosforge", "new", "greeter", "tic_tac_toe", "--remove-existing"])
            .expect("parse");

        match cli.command {
            Command::New {
                project,
                template,
                remove_existing,
            } => {
                assert_eq!(project, "greeter");
                assert_eq!(template.as_deref(), Some("tic_tac_toe"));
                assert!(remove_existing);
            }
            Command::Accounts { .. } => panic!("expected new"),
        }
        assert_eq!(cli.config, PathBuf::from("eosforge.toml"));
    }

    #[test]
    fn accounts_clear_collects_keeps() {
        let cli = Cli::try_parse_from([
            "eosforge", "--config", "x.toml", "accounts", "clear", "--keep", "alice", "--keep", "bob",
        ])
        .expect("parse");

        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert!(matches!(
            cli.command,
            Command::Accounts { action: AccountsCommand::Clear { ref keep } } if keep == &["alice", "bob"]
        ));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["eosforge", "deploy"]).is_err());
    }
}
