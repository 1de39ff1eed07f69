mod api;
mod cli;
mod config;
mod error;
mod job;
mod logging;
mod runner;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;

use api::ApiClient;
use cli::Cli;
use config::LocalJobConfig;
use runner::JobRunner;
use ui::RunProgress;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help still goes to stdout but exits 1; only --version is a clean exit.
            let _ = e.print();
            return if e.kind() == ErrorKind::DisplayVersion {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            RunProgress::new().error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = LocalJobConfig::load(cli.config.as_deref())?;
    let (api_url, settings) = cli.settings(config);

    let api = ApiClient::new(&api_url)?;
    debug!(api_url = api.base_url(), license = %settings.license_file.display(), "starting run");

    let runner = JobRunner::new(api, settings);
    let report = runner.run(&cli.input).await?;

    if cli.verbose {
        RunProgress::new().print_report(&report);
    }
    Ok(())
}
