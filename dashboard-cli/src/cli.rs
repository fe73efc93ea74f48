//! Command-line arguments.

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dashboard",
    version,
    about = "List admin dashboard records from a REST API",
    long_about = "Fetch one page of a REST collection and print it as a table.\n\nExamples:\n  dashboard login --token <TOKEN>\n  dashboard list --endpoint /api/v1/orders --page 2\n  dashboard list --sort title\n  dashboard logout"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "URL", help = "API base URL (overrides config).")]
    pub api_url: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Path to config file (defaults to <config dir>/dashboard/config.toml)."
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log at debug level.")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print one page of the configured collection (default).
    List(ListArgs),
    /// Store a session token.
    Login(LoginArgs),
    /// Remove the stored session.
    Logout,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long, value_name = "PATH", help = "Collection path (overrides config).")]
    pub endpoint: Option<String>,

    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Page to fetch, starting at 1."
    )]
    pub page: Option<u32>,

    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Records per page (overrides config)."
    )]
    pub page_size: Option<u32>,

    #[arg(long, value_name = "KEY", help = "Sort by a sortable column.")]
    pub sort: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long, help = "Bearer token issued by the API.")]
    pub token: String,

    #[arg(long, help = "Refresh token issued alongside the access token.")]
    pub refresh: Option<String>,

    #[arg(long, help = "ID of the signed-in user.")]
    pub id: Option<String>,

    #[arg(long, help = "Username of the signed-in user.")]
    pub username: Option<String>,
}
