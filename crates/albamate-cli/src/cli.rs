//! Command-line definition.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub(crate) const DEFAULT_API_URL: &str = "https://api.albamate.example";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Browse Albamate listings and manage scraps from the terminal.
#[derive(Debug, Parser)]
#[command(name = "albamate", version, about)]
pub(crate) struct Cli {
    /// Base URL of the Albamate backend.
    #[arg(long, env = "ALBAMATE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub(crate) api_url: String,

    /// Bearer token for authenticated operations.
    #[arg(long, env = "ALBAMATE_TOKEN", global = true)]
    pub(crate) token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub(crate) timeout: u64,

    /// Output rendering.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub(crate) format: OutputFormat,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List job postings.
    List(ListArgs),
    /// Show the detail view of one posting.
    Show {
        /// Form identifier.
        form_id: i64,
    },
    /// Toggle the scrap state of one posting.
    Scrap {
        /// Form identifier.
        form_id: i64,
    },
    /// List the postings you have scrapped.
    MyScraps,
    /// List the postings you own.
    MyListings,
}

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Page size.
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: u32,

    /// Sort order.
    #[arg(long, value_enum, default_value_t = OrderByArg::MostRecent)]
    pub(crate) order_by: OrderByArg,

    /// Free-text search keyword.
    #[arg(long)]
    pub(crate) keyword: Option<String>,

    /// Only show postings still recruiting.
    #[arg(long)]
    pub(crate) recruiting: bool,

    /// Fetch every page instead of the first one.
    #[arg(long)]
    pub(crate) all: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OrderByArg {
    MostRecent,
    HighestWage,
    MostApplied,
    MostScrapped,
}

impl From<OrderByArg> for albamate_core::OrderBy {
    fn from(arg: OrderByArg) -> Self {
        match arg {
            OrderByArg::MostRecent => Self::MostRecent,
            OrderByArg::HighestWage => Self::HighestWage,
            OrderByArg::MostApplied => Self::MostApplied,
            OrderByArg::MostScrapped => Self::MostScrapped,
        }
    }
}

pub(crate) fn command_label(command: &Command) -> &'static str {
    match command {
        Command::List(_) => "list",
        Command::Show { .. } => "show",
        Command::Scrap { .. } => "scrap",
        Command::MyScraps => "my-scraps",
        Command::MyListings => "my-listings",
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_scrap_command() {
        let cli = Cli::parse_from(["albamate", "scrap", "42", "--token", "t"]);
        assert!(matches!(cli.command, Command::Scrap { form_id: 42 }));
        assert_eq!(cli.token.as_deref(), Some("t"));
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::parse_from([
            "albamate",
            "list",
            "--limit",
            "5",
            "--order-by",
            "highest-wage",
            "--recruiting",
        ]);
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.limit, 5);
        assert_eq!(args.order_by, OrderByArg::HighestWage);
        assert!(args.recruiting);
        assert!(!args.all);
    }
}
