//! Domain models for the rental tracker.
//!
//! This module contains the core domain types: cars, their rental state,
//! car identifiers, and configuration.

/// Car records and rental state.
pub mod car;
pub use car::{Availability, Car, DailyRate, DailyRateError, Rental};

/// Car identifiers.
pub mod car_id;
pub use car_id::{CarId, CarIdError};

mod config;
pub use config::Config;
