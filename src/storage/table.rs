//! The on-disk rental table.
//!
//! The table is a CSV file whose first line is the fixed header
//! [`HEADERS`]. Each following line is one car. Rental columns are empty
//! for an available car, and either all filled or all empty otherwise.

use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    num::NonZeroU32,
    path::Path,
};

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

use crate::domain::{Car, CarId, CarIdError, DailyRate, Rental};

/// The header row of the rental table, in column order.
pub const HEADERS: [&str; 6] = [
    "CarID",
    "CarName",
    "DailyRate",
    "RentedBy",
    "NumberOfDays",
    "DateRented",
];

/// The rows of the rental table, in storage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    cars: Vec<Car>,
}

impl Table {
    /// Reads a table, header row included.
    ///
    /// # Errors
    ///
    /// Returns an error if the header does not match [`HEADERS`], a row has
    /// the wrong number of cells, a cell cannot be parsed, a rental is only
    /// partly filled in, or a car ID appears twice.
    pub fn read<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if !headers.iter().eq(HEADERS) {
            return Err(TableError::Header {
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        let mut cars = Vec::new();
        let mut seen = HashSet::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);
            let row: Row = record.deserialize(Some(&headers))?;
            let car = row.into_car().map_err(|reason| TableError::Row { line, reason })?;
            if !seen.insert(car.id()) {
                return Err(TableError::Row {
                    line,
                    reason: format!("duplicate car ID {}", car.id()),
                });
            }
            cars.push(car);
        }

        Ok(Self { cars })
    }

    /// Writes the table, header row first, rendering IDs `digits` wide.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write<W: Write>(&self, writer: W, digits: usize) -> Result<(), TableError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(HEADERS)?;
        for car in &self.cars {
            writer.serialize(Row::from_car(car, digits))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Loads a table from a file.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Io`] with [`io::ErrorKind::NotFound`] if the file
    /// does not exist, or any error from [`Table::read`].
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Writes the table to a file, replacing its contents.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save(&self, path: &Path, digits: usize) -> Result<(), TableError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write(BufWriter::new(file), digits)
    }

    /// Returns the cars in storage order.
    #[must_use]
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Returns the number of cars.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cars.len()
    }

    /// Whether the table holds no cars.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cars.is_empty()
    }

    /// Finds a car by ID.
    #[must_use]
    pub fn get(&self, id: CarId) -> Option<&Car> {
        self.cars.iter().find(|car| car.id() == id)
    }

    /// Finds a car by ID for modification.
    pub fn get_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.iter_mut().find(|car| car.id() == id)
    }

    /// Appends a car to the end of the table.
    pub fn push(&mut self, car: Car) {
        self.cars.push(car);
    }

    /// Removes the car with the given ID, returning it.
    pub fn remove(&mut self, id: CarId) -> Option<Car> {
        let position = self.cars.iter().position(|car| car.id() == id)?;
        Some(self.cars.remove(position))
    }

    /// The ID the next added car receives: one more than the largest ID in
    /// the table, or [`CarId::FIRST`] for an empty table.
    ///
    /// IDs freed by deletions are not reused unless they were the largest.
    ///
    /// # Errors
    ///
    /// Returns an error if the largest ID is already the maximum.
    pub fn next_id(&self) -> Result<CarId, CarIdError> {
        self.cars
            .iter()
            .map(Car::id)
            .max()
            .map_or(Ok(CarId::FIRST), CarId::next)
    }
}

/// Errors produced when reading or writing the rental table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The CSV layer rejected the file, e.g. a row with the wrong number of
    /// cells or a cell of the wrong type.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The first row is not the expected header.
    #[error("unexpected header '{found}', expected '{}'", HEADERS.join(","))]
    Header {
        /// The header row actually found.
        found: String,
    },

    /// A row parsed as CSV but is not a valid car.
    #[error("line {line}: {reason}")]
    Row {
        /// The 1-based line number of the row.
        line: u64,
        /// What is wrong with the row.
        reason: String,
    },
}

impl TableError {
    /// Whether this error means the table file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            Self::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(e) => e.kind() == io::ErrorKind::NotFound,
                _ => false,
            },
            Self::Header { .. } | Self::Row { .. } => false,
        }
    }
}

/// A car as stored in one row of the table.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "CarID")]
    car_id: String,
    #[serde(rename = "CarName")]
    car_name: String,
    #[serde(rename = "DailyRate")]
    daily_rate: f64,
    #[serde(rename = "RentedBy")]
    rented_by: Option<String>,
    #[serde(rename = "NumberOfDays")]
    number_of_days: Option<u32>,
    #[serde(rename = "DateRented")]
    date_rented: Option<NaiveDate>,
}

impl Row {
    fn from_car(car: &Car, digits: usize) -> Self {
        let rental = car.rental();
        Self {
            car_id: car.id().display(digits).to_string(),
            car_name: car.name().to_string(),
            daily_rate: car.daily_rate().get(),
            rented_by: rental.map(|r| r.customer.as_str().to_string()),
            number_of_days: rental.map(|r| r.days.get()),
            date_rented: rental.map(|r| r.since),
        }
    }

    fn into_car(self) -> Result<Car, String> {
        let id: CarId = self.car_id.parse().map_err(|e: CarIdError| e.to_string())?;
        let name = NonEmptyString::new(self.car_name)
            .map_err(|_| format!("car {id} has an empty name"))?;
        let daily_rate = DailyRate::new(self.daily_rate).map_err(|e| e.to_string())?;

        let rental = match (self.rented_by, self.number_of_days, self.date_rented) {
            (None, None, None) => None,
            (Some(customer), Some(days), Some(since)) => {
                let customer = NonEmptyString::new(customer)
                    .map_err(|_| format!("car {id} is rented by an empty name"))?;
                let days = NonZeroU32::new(days)
                    .ok_or_else(|| format!("car {id} is rented for zero days"))?;
                Some(Rental {
                    customer,
                    days,
                    since,
                })
            }
            _ => {
                return Err(format!(
                    "car {id} has a partial rental: RentedBy, NumberOfDays and DateRented must be \
                     set together"
                ));
            }
        };

        Ok(Car::new(id, name, daily_rate).with_rental(rental))
    }
}
