//! Synthetic booking-request generation for airline revenue-management
//! simulation.
//!
//! A [`DemandConfig`] is expanded into one [`DemandStream`] per route,
//! departure date and cabin. Each stream draws its total number of
//! requests, then places them one at a time in chronological order; the
//! [`DemandManager`] merges all streams onto an [`EventQueue`].

pub mod characteristics;
pub mod config;
pub mod context;
pub mod demand_manager;
pub mod demand_stream;
pub mod dictionary;
pub mod distribution;
pub mod error;
pub mod event;
pub mod event_queue;
pub mod key;
pub mod progress;
pub mod request;
pub mod rng;
pub mod sampler;
pub mod types;

pub use config::DemandConfig;
pub use demand_manager::DemandManager;
pub use demand_stream::DemandStream;
pub use error::{DemandError, DemandResult};
pub use event::DemandEvent;
pub use event_queue::{EventQueue, TimelineQueue};
pub use request::BookingRequest;
