use clap::{CommandFactory, Parser};

use review_agent::cli::args::Args;
use review_agent::commands::route_command;
use review_agent::config::Config;
use review_agent::infrastructure::setup_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::new()?;

    config.update_from_args(&args);
    setup_logging(config.logging_config()?)?;
    if let Some(path) = &config.config_file {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    config.validate()?;

    if !route_command(&args, &config).await? {
        Args::command().print_help()?;
        println!();
    }

    Ok(())
}
