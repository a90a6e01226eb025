use skyroute_core::SkyrouteServices;

use crate::cli::AirspaceArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(
    args: &AirspaceArgs,
    services: &SkyrouteServices,
    pretty: bool,
) -> Result<(), CliError> {
    let snapshot = services
        .airspace
        .query(
            Some(&args.lamin),
            Some(&args.lomin),
            Some(&args.lamax),
            Some(&args.lomax),
        )
        .await?;
    output::render(&snapshot, pretty)
}
