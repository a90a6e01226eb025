use skyroute_core::{AircraftId, SkyrouteServices};

use crate::cli::TrackArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(
    args: &TrackArgs,
    services: &SkyrouteServices,
    pretty: bool,
) -> Result<(), CliError> {
    let aircraft = AircraftId::parse(&args.icao24)?;
    let track = services.client.track(&aircraft).await?;
    output::render(&track, pretty)
}
