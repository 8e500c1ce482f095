//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Mirror a directory of Markdown documents onto a tree of wiki pages
#[derive(Parser, Debug)]
#[command(name = "wikisync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize a directory into the pages under a root page
    ///
    /// The API token is read from the WIKISYNC_TOKEN environment variable.
    ///
    /// Examples:
    ///   wikisync sync docs --root 123456             # Preview, confirm, apply
    ///   wikisync sync docs --root 123456 --dry-run   # Preview only
    ///   wikisync sync docs --root 123456 --yes       # No prompts
    Sync {
        /// Source directory
        dir: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Answer yes to both confirmations
        #[arg(short, long)]
        yes: bool,

        /// Output the run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a sync would change
    Plan {
        /// Source directory
        dir: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Output the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the pages created by previous runs
    History {
        /// Source directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Root page and connection overrides
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    /// Id of the page the directory is mirrored under
    #[arg(long)]
    pub root: String,

    /// Wiki site URL, overriding remote.base_url
    #[arg(long, env = "WIKISYNC_BASE_URL")]
    pub base_url: Option<String>,

    /// Space key for new pages, overriding remote.space
    #[arg(long)]
    pub space: Option<String>,

    /// Account name for basic auth, overriding remote.username
    #[arg(long)]
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_sync_flags() {
        let cli = Cli::parse_from(["wikisync", "sync", "docs", "--root", "42", "--dry-run", "-y"]);
        match cli.command {
            Some(Commands::Sync {
                dir,
                target,
                dry_run,
                yes,
                json,
            }) => {
                assert_eq!(dir, PathBuf::from("docs"));
                assert_eq!(target.root, "42");
                assert!(dry_run);
                assert!(yes);
                assert!(!json);
            }
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn history_defaults_to_current_dir() {
        let cli = Cli::parse_from(["wikisync", "history"]);
        assert_eq!(
            cli.command,
            Some(Commands::History {
                dir: PathBuf::from("."),
                json: false
            })
        );
    }

    #[test]
    fn root_is_required() {
        assert!(Cli::try_parse_from(["wikisync", "plan", "docs"]).is_err());
    }
}
