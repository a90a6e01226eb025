use skyroute_core::{Callsign, SkyrouteServices, ValidationError};
use skyroute_web::RouteResponse;

use crate::cli::RouteArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(
    args: &RouteArgs,
    services: &SkyrouteServices,
    pretty: bool,
) -> Result<(), CliError> {
    let callsign = Callsign::parse(&args.callsign).ok_or(ValidationError::MissingCallsign)?;
    // Warm the cache so a previously confirmed route is answered offline.
    services.warm_up().await;

    let response = match services.routes.resolve(callsign.as_str()).await? {
        Some(record) => RouteResponse::from(record),
        None => RouteResponse::empty(Some(String::from(callsign))),
    };
    output::render(&response, pretty)
}
