use std::{fmt, num::NonZeroU32, str::FromStr};

/// Width used when a [`CarId`] is rendered without an explicit width.
pub const DEFAULT_DIGITS: usize = 5;

/// The identifier of a car in the rental table.
///
/// Identifiers are positive integers. On disk and on screen they are rendered
/// zero-padded to a fixed width (five digits by default), e.g. `00042`.
///
/// Equality is numeric, so `"42"` and `"00042"` parse to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarId(NonZeroU32);

impl CarId {
    /// The id assigned to the first car in an empty table.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Create an id from its numeric value.
    #[must_use]
    pub const fn new(value: NonZeroU32) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns the id following this one.
    ///
    /// # Errors
    ///
    /// Returns [`CarIdError::Exhausted`] if the numeric space is used up.
    pub fn next(self) -> Result<Self, CarIdError> {
        self.0.checked_add(1).map(Self).ok_or(CarIdError::Exhausted)
    }

    /// Returns a displayable representation padded to `digits` characters.
    ///
    /// ```
    /// use std::num::NonZeroU32;
    ///
    /// use rental::CarId;
    ///
    /// let id = CarId::new(NonZeroU32::new(7).unwrap());
    /// assert_eq!(id.display(5).to_string(), "00007");
    /// assert_eq!(id.display(2).to_string(), "07");
    /// ```
    #[must_use]
    pub const fn display(self, digits: usize) -> FormattedCarId {
        FormattedCarId { id: self, digits }
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display(DEFAULT_DIGITS))
    }
}

/// A [`CarId`] paired with the width it should be padded to.
///
/// Returned by [`CarId::display`].
#[derive(Debug, Clone, Copy)]
pub struct FormattedCarId {
    id: CarId,
    digits: usize,
}

impl fmt::Display for FormattedCarId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:0width$}", self.id.get(), width = self.digits)
    }
}

impl FromStr for CarId {
    type Err = CarIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(CarIdError::Syntax(s.to_string()));
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| CarIdError::Syntax(s.to_string()))?;
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| CarIdError::Zero(s.to_string()))
    }
}

/// Errors produced when parsing or allocating a [`CarId`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CarIdError {
    /// The string is not a run of ASCII digits.
    #[error("Invalid car ID '{0}': expected digits, e.g. 00001")]
    Syntax(String),

    /// The string parsed to zero, which is never assigned.
    #[error("Invalid car ID '{0}': IDs start at 1")]
    Zero(String),

    /// No further ids can be allocated.
    #[error("No car IDs left to allocate")]
    Exhausted,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("00001", 1; "padded")]
    #[test_case("1", 1; "unpadded")]
    #[test_case(" 00042 ", 42; "surrounding whitespace")]
    #[test_case("123456", 123_456; "wider than default")]
    fn parses_valid_ids(input: &str, expected: u32) {
        let id: CarId = input.parse().unwrap();
        assert_eq!(id.get(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("abc"; "letters")]
    #[test_case("-1"; "negative")]
    #[test_case("1.0"; "decimal")]
    fn rejects_malformed_ids(input: &str) {
        let err = input.parse::<CarId>().unwrap_err();
        assert!(matches!(err, CarIdError::Syntax(_)));
    }

    #[test]
    fn rejects_zero() {
        let err = "00000".parse::<CarId>().unwrap_err();
        assert_eq!(err, CarIdError::Zero("00000".to_string()));
    }

    #[test]
    fn display_pads_to_default_width() {
        let id: CarId = "3".parse().unwrap();
        assert_eq!(id.to_string(), "00003");
    }

    #[test]
    fn padded_and_unpadded_compare_equal() {
        let a: CarId = "00012".parse().unwrap();
        let b: CarId = "12".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn next_increments() {
        assert_eq!(CarId::FIRST.next().unwrap().get(), 2);
        let last = CarId::new(NonZeroU32::MAX);
        assert_eq!(last.next(), Err(CarIdError::Exhausted));
    }
}
