//! CLI argument definitions for skyroute.
//!
//! The binary either runs the HTTP server or performs a single lookup and prints the
//! result as JSON. Every lookup goes through the same services the server uses, so
//! credentials, caching and fallbacks behave identically.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the HTTP API |
//! | `airspace` | Aircraft inside a bounding box |
//! | `summary` | Flight summary for an aircraft |
//! | `route` | Published route for a callsign |
//! | `track` | Latest track for an aircraft |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--port` | `PORT` or `8080` | Listen port for `serve` |
//! | `--api-url` | `OPENSKY_API_URL` | Upstream API base URL |
//!
//! # Examples
//!
//! ```bash
//! skyroute serve --port 8080
//! skyroute airspace --lamin 43 --lomin -80 --lamax 44 --lomax -79 --pretty
//! skyroute summary c0ffee --callsign ACA856
//! skyroute route ACA856
//! ```

use clap::{Args, Parser, Subcommand};

/// skyroute - live flight data aggregation
#[derive(Debug, Parser)]
#[command(
    name = "skyroute",
    author,
    version,
    about = "Live flight data aggregation over the OpenSky Network"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Override the listen port from the environment.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Override the upstream API base URL from the environment.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    ///
    /// Restores the route cache snapshot, starts the periodic cache sweep and
    /// serves `/api/*` and `/health` until interrupted.
    Serve,

    /// Fetch aircraft currently inside a bounding box.
    ///
    /// # Examples
    ///
    ///   skyroute airspace --lamin 43 --lomin -80 --lamax 44 --lomax -79
    Airspace(AirspaceArgs),

    /// Build the flight summary for an aircraft.
    ///
    /// # Examples
    ///
    ///   skyroute summary c0ffee
    ///   skyroute summary c0ffee --callsign ACA856
    Summary(SummaryArgs),

    /// Look up the published route for a callsign.
    Route(RouteArgs),

    /// Fetch the latest track for an aircraft.
    Track(TrackArgs),
}

/// Coordinates are taken as text so an invalid value is reported by name.
#[derive(Debug, Args)]
pub struct AirspaceArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub lamin: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lomin: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lamax: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lomax: String,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// 24-bit ICAO transponder address in hex.
    pub icao24: String,

    /// Callsign hint used when the aircraft has no recent history.
    #[arg(long)]
    pub callsign: Option<String>,
}

#[derive(Debug, Args)]
pub struct RouteArgs {
    pub callsign: String,
}

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// 24-bit ICAO transponder address in hex.
    pub icao24: String,
}
