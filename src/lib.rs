//! Single-file car rental tracking
//!
//! Cars and their rentals are rows in one table on disk. Every operation
//! reloads the table, applies one change, and writes it straight back.

pub mod domain;
pub use domain::{Availability, Car, CarId, Config, DailyRate, Rental};

/// Persistence of the rental table.
pub mod storage;
pub use storage::{DeletePolicy, RentalStore, StoreError};
