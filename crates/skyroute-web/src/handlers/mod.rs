pub mod airspace;
pub mod flight;
pub mod health;
pub mod routes;
