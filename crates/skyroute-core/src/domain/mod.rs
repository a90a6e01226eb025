//! # Domain Models
//!
//! Canonical types shared by the upstream client, the resolvers and the web layer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AircraftId`] | Normalised (lowercase) icao24 transponder address |
//! | [`Callsign`] | Normalised (trimmed, uppercase) flight identifier |
//! | [`BoundingBox`] | Validated lat/lon rectangle for airspace queries |
//! | [`Aircraft`] | One live state vector |
//! | [`FlightRecord`] | Raw flight from the history or movement endpoints |
//! | [`RouteRecord`] | Published itinerary for a callsign |
//! | [`FlightSummary`] | Reconciled output record |
//!
//! Upstream timestamps are unix seconds throughout.

mod airspace;
mod flight;
mod ids;
mod route;

pub use airspace::{Aircraft, AirspaceSnapshot, BoundingBox, MAX_BBOX_AREA};
pub use flight::{AirportDetail, FlightRecord, FlightSummary, FlightTrack, SourceTag};
pub use ids::{AircraftId, Callsign};
pub use route::{RouteLookup, RouteRecord};
