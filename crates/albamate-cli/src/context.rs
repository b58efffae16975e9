//! Shared error type and application context for command handlers.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use albamate_cache::QueryCache;
use albamate_client::{ClientConfig, RestClient, StaticSession};
use albamate_events::NoticeBus;
use albamate_sync::{CachedDirectory, ToggleController};
use anyhow::anyhow;
use url::Url;

use crate::cli::Cli;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) notices: NoticeBus,
    pub(crate) directory: CachedDirectory<RestClient>,
    pub(crate) controller: ToggleController<StaticSession, RestClient>,
}

impl AppContext {
    /// Build the shared cache, HTTP client, session, and synchronizer from
    /// CLI options.
    pub(crate) fn from_cli(cli: &Cli) -> CliResult<Self> {
        let base_url: Url = cli
            .api_url
            .parse()
            .map_err(|err| CliError::validation(format!("invalid API URL '{}': {err}", cli.api_url)))?;

        let mut config = ClientConfig::new(base_url).with_timeout(Duration::from_secs(cli.timeout));
        if let Some(token) = &cli.token {
            config = config.with_bearer_token(token.clone());
        }

        let rest = Arc::new(
            RestClient::new(&config)
                .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?,
        );
        let session = Arc::new(match &cli.token {
            Some(token) => StaticSession::with_token(token.clone()),
            None => StaticSession::guest(),
        });

        let cache = QueryCache::new();
        let notices = NoticeBus::new();
        let directory = CachedDirectory::new(cache.clone(), rest.clone());
        let controller = ToggleController::new(cache, session, rest, notices.clone());

        Ok(Self {
            notices,
            directory,
            controller,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_the_rendered_message() {
        let validation = CliError::validation("missing form id");
        assert_eq!(validation.to_string(), "missing form id");
        assert_eq!(validation.exit_code(), 2);

        let failure = CliError::failure(anyhow!("backend unreachable"));
        assert_eq!(failure.to_string(), failure.display_message());
        assert_eq!(failure.exit_code(), 3);
    }
}
