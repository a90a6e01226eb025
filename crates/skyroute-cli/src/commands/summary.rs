use skyroute_core::SkyrouteServices;

use crate::cli::SummaryArgs;
use crate::error::CliError;
use crate::output;

/// Prints `null` when no flight could be found for the aircraft.
pub async fn run(
    args: &SummaryArgs,
    services: &SkyrouteServices,
    pretty: bool,
) -> Result<(), CliError> {
    let summary = services
        .summaries
        .summarize(&args.icao24, args.callsign.as_deref())
        .await?;
    output::render(&summary, pretty)
}
