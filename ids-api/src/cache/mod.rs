//! Live-data caching: snapshot types, feed clients, and refresh tasks

mod feeds;
mod refresh;
mod snapshot;

pub use feeds::FeedClient;
pub use refresh::start_refreshers;
pub use snapshot::{
    Aircraft, AircraftSnapshot, AirportInfoSnapshot, AirportWx, CacheStore, ControllerSnapshot,
};
