//! # Skyroute Core
//!
//! Aggregation layer that turns OpenSky live state, flight history and route tables into
//! coherent flight summaries while keeping upstream traffic low.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`airports`] | Read-only airport directory |
//! | [`airspace`] | Cached bounding-box traffic queries |
//! | [`cache`] | Per-entry TTL cache |
//! | [`clock`] | Injectable wall clock |
//! | [`config`] | Environment-driven settings |
//! | [`credentials`] | OAuth client-credentials token lifecycle |
//! | [`domain`] | Identifiers, flight records and summaries |
//! | [`error`] | Validation, upstream and persistence errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`movements`] | Airport arrival/departure fallback lookups |
//! | [`opensky`] | OpenSky REST adapter |
//! | [`route_store`] | Route cache with a JSON snapshot |
//! | [`routes`] | Callsign to route resolution |
//! | [`services`] | Service graph wiring |
//! | [`summary`] | Flight summary orchestration |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skyroute_core::{SkyrouteConfig, SkyrouteServices};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let services = SkyrouteServices::from_config(&SkyrouteConfig::from_env())?;
//!     services.warm_up().await;
//!
//!     if let Some(summary) = services.summaries.summarize("3c6444", None).await? {
//!         println!("{:?} -> {:?}", summary.departure_airport_code, summary.arrival_airport_code);
//!     }
//!     Ok(())
//! }
//! ```

pub mod airports;
pub mod airspace;
pub mod cache;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod movements;
pub mod opensky;
pub mod route_store;
pub mod routes;
pub mod services;
pub mod summary;

pub use airports::{AirportDirectory, AirportInfo, DirectoryError};
pub use airspace::AirspaceService;
pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BasicCredentials, OAuthCredentials, SkyrouteConfig};
pub use credentials::{CredentialProvider, Token};
pub use domain::{
    Aircraft, AircraftId, AirportDetail, AirspaceSnapshot, BoundingBox, Callsign, FlightRecord,
    FlightSummary, FlightTrack, RouteLookup, RouteRecord, SourceTag, MAX_BBOX_AREA,
};
pub use error::{CoreError, PersistenceError, UpstreamError, UpstreamErrorKind, ValidationError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};
pub use movements::{AirportMovementFinder, MovementKind, MovementLookup, SearchWindow};
pub use opensky::OpenSkyClient;
pub use route_store::PersistentRouteCache;
pub use routes::RouteResolver;
pub use services::{SkyrouteServices, SweepReport};
pub use summary::FlightSummaryResolver;
