use std::{fmt, num::NonZeroU32, str::FromStr};

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;

use crate::domain::CarId;

/// A car in the rental table.
///
/// A car is either available (`rental` is `None`) or rented. The rental
/// details travel together in [`Rental`], so a record can never carry a
/// renter without a duration and start date, or vice versa.
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    id: CarId,
    name: NonEmptyString,
    daily_rate: DailyRate,
    rental: Option<Rental>,
}

impl Car {
    /// Create an available car.
    #[must_use]
    pub const fn new(id: CarId, name: NonEmptyString, daily_rate: DailyRate) -> Self {
        Self {
            id,
            name,
            daily_rate,
            rental: None,
        }
    }

    /// Create a car with the given rental state.
    #[must_use]
    pub fn with_rental(mut self, rental: Option<Rental>) -> Self {
        self.rental = rental;
        self
    }

    /// Returns the car's id.
    #[must_use]
    pub const fn id(&self) -> CarId {
        self.id
    }

    /// Returns the car's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the price per day.
    #[must_use]
    pub const fn daily_rate(&self) -> DailyRate {
        self.daily_rate
    }

    /// Returns the current rental, if any.
    #[must_use]
    pub const fn rental(&self) -> Option<&Rental> {
        self.rental.as_ref()
    }

    /// Whether the car can be rented.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.rental.is_none()
    }

    /// Mark the car as rented.
    ///
    /// Returns `false` and leaves the car untouched if it is already rented.
    pub fn rent(&mut self, rental: Rental) -> bool {
        if self.rental.is_some() {
            return false;
        }
        self.rental = Some(rental);
        true
    }

    /// Clear the rental, returning it.
    ///
    /// Returns `None` if the car was not rented.
    pub fn give_back(&mut self) -> Option<Rental> {
        self.rental.take()
    }
}

/// The details of an active rental.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rental {
    /// The name of the customer holding the car.
    pub customer: NonEmptyString,
    /// The number of days requested when the car was rented.
    pub days: NonZeroU32,
    /// The date the rental began.
    pub since: NaiveDate,
}

/// A price per day.
///
/// Rates are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DailyRate(f64);

impl DailyRate {
    /// Create a rate.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is negative, NaN or infinite.
    pub fn new(value: f64) -> Result<Self, DailyRateError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(DailyRateError(value.to_string()))
        }
    }

    /// Returns the rate as a float.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DailyRate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DailyRate {
    type Err = DailyRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| DailyRateError(s.to_string()))?;
        Self::new(value)
    }
}

/// Error returned for a rate that is not a finite, non-negative number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid daily rate '{0}': must be a non-negative number")]
pub struct DailyRateError(String);

/// Which cars a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    /// Every car, rented or not.
    #[default]
    All,
    /// Only cars with no current renter.
    AvailableOnly,
}

impl Availability {
    /// Whether `car` belongs in a listing with this filter.
    #[must_use]
    pub const fn admits(self, car: &Car) -> bool {
        match self {
            Self::All => true,
            Self::AvailableOnly => car.is_available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn sedan() -> Car {
        Car::new(
            CarId::FIRST,
            NonEmptyString::new("Sedan".to_string()).unwrap(),
            DailyRate::new(49.99).unwrap(),
        )
    }

    fn rental(customer: &str) -> Rental {
        Rental {
            customer: NonEmptyString::new(customer.to_string()).unwrap(),
            days: NonZeroU32::new(3).unwrap(),
            since: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    #[test]
    fn new_car_is_available() {
        let car = sedan();
        assert!(car.is_available());
        assert!(car.rental().is_none());
    }

    #[test]
    fn renting_twice_keeps_first_rental() {
        let mut car = sedan();
        assert!(car.rent(rental("Alice")));
        assert!(!car.rent(rental("Bob")));
        assert_eq!(car.rental().unwrap().customer.as_str(), "Alice");
    }

    #[test]
    fn give_back_clears_rental() {
        let mut car = sedan();
        car.rent(rental("Alice"));

        let returned = car.give_back().unwrap();
        assert_eq!(returned.customer.as_str(), "Alice");
        assert!(car.is_available());
        assert!(car.give_back().is_none());
    }

    #[test_case("49.99", 49.99; "decimal")]
    #[test_case("0", 0.0; "free")]
    #[test_case(" 12 ", 12.0; "whitespace")]
    fn parses_valid_rates(input: &str, expected: f64) {
        let rate: DailyRate = input.parse().unwrap();
        assert!((rate.get() - expected).abs() < f64::EPSILON);
    }

    #[test_case("-1"; "negative")]
    #[test_case("abc"; "not a number")]
    #[test_case("NaN"; "nan")]
    #[test_case("inf"; "infinite")]
    fn rejects_invalid_rates(input: &str) {
        assert!(input.parse::<DailyRate>().is_err());
    }

    #[test]
    fn availability_filter() {
        let available = sedan();
        let mut rented = sedan();
        rented.rent(rental("Alice"));

        assert!(Availability::All.admits(&available));
        assert!(Availability::All.admits(&rented));
        assert!(Availability::AvailableOnly.admits(&available));
        assert!(!Availability::AvailableOnly.admits(&rented));
    }
}
