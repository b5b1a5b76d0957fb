use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

use crate::domain::types::{EntityId, Role};

/// Command-line arguments for the `quire-cli` binary.
#[derive(Debug, Parser)]
#[command(
    name = "quire-cli",
    version,
    about = "Search, filter and batch-moderate admin collections"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "QUIRE_CONFIG_FILE", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Backend base URL, e.g. <https://blog.example.com>
    #[arg(long = "site", env = "QUIRE_SITE_URL", value_name = "URL", global = true)]
    pub site: Option<String>,

    /// Path prefix of the admin routes (default `admin`).
    #[arg(long = "path-prefix", value_name = "PREFIX", global = true)]
    pub path_prefix: Option<String>,

    /// File containing the API bearer token (takes precedence over config/env).
    #[arg(long = "token-file", env = "QUIRE_TOKEN_FILE", value_name = "PATH", value_hint = ValueHint::FilePath, global = true)]
    pub token_file: Option<PathBuf>,

    /// Override the per-request timeout.
    #[arg(long = "timeout-seconds", value_name = "SECONDS", global = true)]
    pub timeout_seconds: Option<u64>,

    /// Override how many mutation requests run at once.
    #[arg(long = "concurrency", value_name = "COUNT", global = true)]
    pub concurrency: Option<u32>,

    /// Override the number of attempts for requests that never reached the server.
    #[arg(long = "max-attempts", value_name = "COUNT", global = true)]
    pub max_attempts: Option<u32>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// User accounts (list/delete/set-role)
    Users(UsersArgs),
    /// Comment moderation (list/approve/reject/delete)
    Comments(ModerationArgs),
    /// Post moderation (list/approve/reject/delete)
    Posts(ModerationArgs),
}

#[derive(Debug, Args, Clone)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersCmd,
}

#[derive(Debug, Subcommand, Clone)]
pub enum UsersCmd {
    /// List one page of users after client-side search/filter/sort
    List(ListArgs),
    /// Delete the selected users
    Delete(SelectionArgs),
    /// Change the role of the selected users
    SetRole {
        /// Target role: U (user), A (admin) or D (developer)
        #[arg(long, value_parser = parse_role)]
        role: Role,
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(Debug, Args, Clone)]
pub struct ModerationArgs {
    #[command(subcommand)]
    pub action: ModerationCmd,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ModerationCmd {
    /// List one page after client-side search/filter/sort
    List(ListArgs),
    /// Approve the selected entries
    Approve(SelectionArgs),
    /// Reject the selected entries
    Reject(SelectionArgs),
    /// Delete the selected entries
    Delete(SelectionArgs),
}

/// Criteria shared by listing and selection.
#[derive(Debug, Args, Default, Clone)]
pub struct CriteriaArgs {
    /// Server page to load.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Case-insensitive text search.
    #[arg(long)]
    pub search: Option<String>,

    /// Category filter: role code for users, approval status otherwise.
    #[arg(long, visible_alias = "status")]
    pub filter: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub criteria: CriteriaArgs,

    /// Sort the visible rows.
    #[arg(long)]
    pub sort: Option<SortKeyArg>,

    /// Sort descending.
    #[arg(long, default_value_t = false)]
    pub desc: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// Entity ids to act on.
    #[arg(value_name = "ID")]
    pub ids: Vec<EntityId>,

    /// Act on every entry of the page that matches the criteria.
    #[arg(long, default_value_t = false)]
    pub all_matching: bool,

    #[command(flatten)]
    pub criteria: CriteriaArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKeyArg {
    Id,
    Label,
    Created,
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse().map_err(|err: quire_api_types::UnknownValue| err.to_string())
}
