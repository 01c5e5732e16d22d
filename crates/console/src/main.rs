use std::io;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use backoffice_client::ClientConfig;
use backoffice_console::{Cli, Console, StdinConfirm, run};
use backoffice_observability::LogFormat;
use backoffice_observability::tracing::LOG_FORMAT_ENV;
use backoffice_query::QueryConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Interactive use: human-readable logs on stderr unless asked otherwise.
    let format: LogFormat = match cli.log_format {
        Some(format) => format.into(),
        None if std::env::var_os(LOG_FORMAT_ENV).is_some() => LogFormat::from_env(),
        None => LogFormat::Pretty,
    };
    backoffice_observability::tracing::init_with(format);

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.clone() {
        config.base_url = url;
    }
    if let Some(token) = cli.token.clone() {
        config = config.with_token(token);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let query = QueryConfig::from_env()?;

    let console = Console::new(&config, query)?;
    tracing::debug!(base_url = %config.base_url, "console ready");

    let mut stdout = io::stdout().lock();
    run(cli.command, &console, &mut stdout, &mut StdinConfirm).await
}
