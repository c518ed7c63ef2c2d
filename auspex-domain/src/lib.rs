//! Auspex Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains the value objects, the classification outcome model, and the
//! signal filter that decides whether a message is worth classifying.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod credentials;
pub mod filter;
pub mod outcome;
pub mod signal;
pub mod value_objects;

// Re-export commonly used types
pub use credentials::Secret;
pub use filter::SignalFilter;
pub use outcome::Outcome;
pub use signal::InboundMessage;
pub use value_objects::{Direction, DomainError, ExposureKey, Instrument, Quantity};
