pub mod api_sports;
pub mod cache;
pub mod coerce;
pub mod events;
pub mod resolver;
pub mod stats;
pub mod types;
