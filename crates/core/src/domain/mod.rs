pub mod client;
pub mod event;
pub mod outfit;
pub mod shift;
pub mod snapshot;
pub mod transaction;
pub mod venue;

pub use client::{Client, ClientId};
pub use event::CloudEvent;
pub use outfit::Outfit;
pub use shift::Shift;
pub use snapshot::Snapshot;
pub use transaction::Transaction;
pub use venue::{Venue, VenueId};
