//! A file backed store of rental cars
//!
//! The [`RentalStore`] keeps no table in memory between calls. Each operation
//! loads the table from disk, applies a single change and saves it straight
//! back, so the file is always the source of truth.

use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use non_empty_string::NonEmptyString;

use crate::{
    domain::{Availability, Car, CarId, CarIdError, Config, DailyRate, Rental},
    storage::table::{Table, TableError},
};

/// Whether [`RentalStore::delete_car`] may remove a rented car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Refuse to delete a car that is currently rented out.
    #[default]
    RefuseRented,
    /// Delete the car whatever its rental state.
    Force,
}

impl DeletePolicy {
    /// Picks the policy for a deletion, given the configuration and whether
    /// the caller asked to force it.
    #[must_use]
    pub const fn new(config: &Config, force: bool) -> Self {
        if force || config.allow_delete_rented {
            Self::Force
        } else {
            Self::RefuseRented
        }
    }
}

/// A rental table stored in a single file.
#[derive(Debug, Clone)]
pub struct RentalStore {
    path: PathBuf,
    digits: usize,
}

impl RentalStore {
    /// Opens the rental table at `path`.
    ///
    /// If no file exists there, a table holding only the header row is
    /// created and saved immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or is not a valid
    /// rental table, or if a new file cannot be written.
    pub fn open(path: impl Into<PathBuf>, config: &Config) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            digits: config.digits(),
        };

        match Table::load(&store.path) {
            Ok(table) => {
                tracing::debug!(
                    "Opened rental table {} with {} cars",
                    store.path.display(),
                    table.len()
                );
            }
            Err(e) if e.is_not_found() => {
                tracing::info!("Creating rental table {}", store.path.display());
                store.save(&Table::default())?;
            }
            Err(source) => {
                return Err(StoreError::Load {
                    path: store.path,
                    source,
                });
            }
        }

        Ok(store)
    }

    /// Returns the path of the rental table.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the width car IDs are padded to.
    #[must_use]
    pub const fn digits(&self) -> usize {
        self.digits
    }

    fn load(&self) -> Result<Table, StoreError> {
        let table = Table::load(&self.path).map_err(|source| StoreError::Load {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!("Loaded {} cars from {}", table.len(), self.path.display());
        Ok(table)
    }

    fn save(&self, table: &Table) -> Result<(), StoreError> {
        table
            .save(&self.path, self.digits)
            .map_err(|source| StoreError::Save {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!("Saved {} cars to {}", table.len(), self.path.display());
        Ok(())
    }

    /// Adds an available car and returns its ID.
    ///
    /// The new ID is one more than the largest ID in the table, so IDs are
    /// never shared between cars even after deletions.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or saved, or if the ID
    /// space is exhausted.
    pub fn add_car(
        &self,
        name: NonEmptyString,
        daily_rate: DailyRate,
    ) -> Result<CarId, StoreError> {
        let mut table = self.load()?;
        let id = table.next_id()?;
        table.push(Car::new(id, name, daily_rate));
        self.save(&table)?;

        tracing::info!("Added car {}", id.display(self.digits));
        Ok(id)
    }

    /// Deletes the car with the given ID.
    ///
    /// Returns `false` if no such car exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CarRented`] if the car is rented out and the
    /// policy is [`DeletePolicy::RefuseRented`]. The table is left unchanged.
    /// Also returns an error if the table cannot be loaded or saved.
    pub fn delete_car(&self, id: CarId, policy: DeletePolicy) -> Result<bool, StoreError> {
        let mut table = self.load()?;

        let Some(car) = table.get(id) else {
            tracing::debug!("No car {} to delete", id.display(self.digits));
            return Ok(false);
        };

        if !car.is_available() && policy == DeletePolicy::RefuseRented {
            return Err(StoreError::CarRented(id));
        }

        table.remove(id);
        self.save(&table)?;

        tracing::info!("Deleted car {}", id.display(self.digits));
        Ok(true)
    }

    /// Returns the cars matching `availability`, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded.
    pub fn cars(&self, availability: Availability) -> Result<Vec<Car>, StoreError> {
        let table = self.load()?;
        Ok(table
            .cars()
            .iter()
            .filter(|car| availability.admits(car))
            .cloned()
            .collect())
    }

    /// Returns the IDs of the cars matching `availability`, in storage order.
    ///
    /// A 1-based position in the available-only listing is what
    /// [`RentalStore::rent_car`] takes as its selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded.
    pub fn list_cars(&self, availability: Availability) -> Result<Vec<CarId>, StoreError> {
        Ok(self.cars(availability)?.iter().map(Car::id).collect())
    }

    /// Returns the IDs of the cars that can be rented, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded.
    pub fn available_cars(&self) -> Result<Vec<CarId>, StoreError> {
        self.list_cars(Availability::AvailableOnly)
    }

    /// Returns the car with the given ID, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded.
    pub fn get(&self, id: CarId) -> Result<Option<Car>, StoreError> {
        Ok(self.load()?.get(id).cloned())
    }

    /// Resolves a 1-based `selection` against a listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SelectionOutOfRange`] if `selection` is zero or
    /// past the end of `listing`.
    pub fn resolve_selection(listing: &[CarId], selection: usize) -> Result<CarId, StoreError> {
        selection
            .checked_sub(1)
            .and_then(|index| listing.get(index))
            .copied()
            .ok_or(StoreError::SelectionOutOfRange {
                selection,
                available: listing.len(),
            })
    }

    /// Rents the `selection`th available car (1-based) to `customer`,
    /// starting today.
    ///
    /// Returns `false` if the selected car disappeared or was rented between
    /// producing the listing and applying the rental.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SelectionOutOfRange`] if the selection does not
    /// name an available car, or an error if the table cannot be loaded or
    /// saved.
    pub fn rent_car(
        &self,
        selection: usize,
        customer: NonEmptyString,
        days: NonZeroU32,
    ) -> Result<bool, StoreError> {
        self.rent_car_on(selection, customer, days, Local::now().date_naive())
    }

    /// Same as [`RentalStore::rent_car`], with an explicit start date.
    ///
    /// # Errors
    ///
    /// See [`RentalStore::rent_car`].
    pub fn rent_car_on(
        &self,
        selection: usize,
        customer: NonEmptyString,
        days: NonZeroU32,
        since: NaiveDate,
    ) -> Result<bool, StoreError> {
        let available = self.available_cars()?;
        let id = Self::resolve_selection(&available, selection)?;
        self.rent_car_by_id(id, customer, days, since)
    }

    /// Rents the car with the given ID to `customer`.
    ///
    /// Returns `false` if there is no such car or it is already rented.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or saved.
    pub fn rent_car_by_id(
        &self,
        id: CarId,
        customer: NonEmptyString,
        days: NonZeroU32,
        since: NaiveDate,
    ) -> Result<bool, StoreError> {
        let mut table = self.load()?;

        let Some(car) = table.get_mut(id) else {
            tracing::debug!("No car {} to rent", id.display(self.digits));
            return Ok(false);
        };

        let rental = Rental {
            customer,
            days,
            since,
        };
        if !car.rent(rental) {
            tracing::debug!("Car {} is already rented", id.display(self.digits));
            return Ok(false);
        }

        self.save(&table)?;

        tracing::info!("Rented car {} for {days} days", id.display(self.digits));
        Ok(true)
    }

    /// Returns a rented car, making it available again.
    ///
    /// Returns `false` if there is no such car or it is not rented.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded or saved.
    pub fn return_car(&self, id: CarId) -> Result<bool, StoreError> {
        let mut table = self.load()?;

        let Some(rental) = table.get_mut(id).and_then(Car::give_back) else {
            tracing::debug!("No rented car {} to return", id.display(self.digits));
            return Ok(false);
        };

        self.save(&table)?;

        tracing::info!("Returned car {}", id.display(self.digits));
        tracing::debug!(customer = rental.customer.as_str(), "rental closed");
        Ok(true)
    }
}

/// Errors produced by [`RentalStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The rental table could not be read.
    #[error("failed to load rental table {}: {source}", path.display())]
    Load {
        /// The path of the table.
        path: PathBuf,
        /// The underlying error.
        source: TableError,
    },

    /// The rental table could not be written.
    #[error("failed to save rental table {}: {source}", path.display())]
    Save {
        /// The path of the table.
        path: PathBuf,
        /// The underlying error.
        source: TableError,
    },

    /// A deletion was refused because the car is rented out.
    #[error("car {0} is rented out; return it first or force the deletion")]
    CarRented(CarId),

    /// A listing selection does not name a car.
    #[error("selection {selection} is out of range: {available} car(s) available")]
    SelectionOutOfRange {
        /// The 1-based selection requested.
        selection: usize,
        /// The number of cars in the listing.
        available: usize,
    },

    /// No further car IDs can be allocated.
    #[error(transparent)]
    Id(#[from] CarIdError),
}
