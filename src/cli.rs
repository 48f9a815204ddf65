use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands::{self, Global, RemoteRunnable, Runnable};
use crate::config::GithubConfig;

/// Flags both tools accept before or after the subcommand.
#[derive(Debug, Clone, Args)]
pub struct OutputFlags {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only warnings and errors on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl OutputFlags {
    pub fn global(&self) -> Global {
        Global { json: self.json }
    }
}

/// 📜 Local git history exporter
#[derive(Parser)]
#[command(
    name = "git-history",
    version,
    about = "📜 Filter, paginate and export commit history of a local Git repo",
    long_about = None,
    arg_required_else_help = true
)]
pub struct HistoryCli {
    #[command(flatten)]
    pub output: OutputFlags,

    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// 📄 Write the filtered history to paginated files
    Export(commands::Export),

    /// 👥 Commits per author over the filtered history
    Authors(commands::Authors),

    /// 🌿 Local branches and their tips
    Branches(commands::Branches),
}

impl HistoryCommand {
    pub fn run(self, g: &Global) -> Result<()> {
        match self {
            HistoryCommand::Export(c) => c.run(g),
            HistoryCommand::Authors(c) => c.run(g),
            HistoryCommand::Branches(c) => c.run(g),
        }
    }
}

/// 🐙 Cached GitHub commit activity
#[derive(Parser)]
#[command(
    name = "gh-activity",
    version,
    about = "🐙 Incrementally fetch and cache a user's commits in a GitHub repo",
    long_about = None,
    arg_required_else_help = true
)]
pub struct ActivityCli {
    #[command(flatten)]
    pub output: OutputFlags,

    #[command(flatten)]
    pub github: GithubConfig,

    #[command(subcommand)]
    pub command: ActivityCommand,
}

#[derive(Subcommand)]
pub enum ActivityCommand {
    /// ⬇️ Fetch missing parts of the window and list commits
    Fetch(commands::Fetch),

    /// 🗂 List cached commits without going online
    Show(commands::Show),

    /// 📊 Cache entries and covered ranges
    Status(commands::Status),

    /// 🧹 Remove cache entries
    Clear(commands::Clear),
}

impl ActivityCommand {
    pub fn run(self, g: &Global, config: &GithubConfig) -> Result<()> {
        match self {
            ActivityCommand::Fetch(c) => c.run(g, config),
            ActivityCommand::Show(c) => c.run(g, config),
            ActivityCommand::Status(c) => c.run(g, config),
            ActivityCommand::Clear(c) => c.run(g, config),
        }
    }
}
