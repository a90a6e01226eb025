mod airspace;
mod route;
mod serve;
mod summary;
mod track;

use skyroute_core::{SkyrouteConfig, SkyrouteServices};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = config_for(cli);
    let services = SkyrouteServices::from_config(&config)?;

    match &cli.command {
        Command::Serve => serve::run(&config, services).await,
        Command::Airspace(args) => airspace::run(args, &services, cli.pretty).await,
        Command::Summary(args) => summary::run(args, &services, cli.pretty).await,
        Command::Route(args) => route::run(args, &services, cli.pretty).await,
        Command::Track(args) => track::run(args, &services, cli.pretty).await,
    }
}

fn config_for(cli: &Cli) -> SkyrouteConfig {
    let mut config = SkyrouteConfig::from_env();
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url.trim_end_matches('/'));
    }
    config
}
