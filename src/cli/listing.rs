//! Console rendering of car listings.

use std::fmt::Write as _;

use anyhow::Context;
use clap::ValueEnum;
use rental::Car;
use serde::Serialize;

use super::terminal;

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Columns of the car table, in display order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Column {
    Number,
    CarId,
    CarName,
    DailyRate,
    RentedBy,
    NumberOfDays,
    DateRented,
}

impl Column {
    pub const ALL: [Self; 7] = [
        Self::Number,
        Self::CarId,
        Self::CarName,
        Self::DailyRate,
        Self::RentedBy,
        Self::NumberOfDays,
        Self::DateRented,
    ];

    const COMPACT: [Self; 4] = [Self::Number, Self::CarId, Self::CarName, Self::DailyRate];

    /// The columns that fit the current terminal.
    pub fn for_terminal() -> &'static [Self] {
        if terminal::is_narrow() {
            &Self::COMPACT
        } else {
            &Self::ALL
        }
    }

    const fn header(self) -> &'static str {
        match self {
            Self::Number => "Number",
            Self::CarId => "CarID",
            Self::CarName => "CarName",
            Self::DailyRate => "DailyRate",
            Self::RentedBy => "RentedBy",
            Self::NumberOfDays => "NumberOfDays",
            Self::DateRented => "DateRented",
        }
    }

    /// Minimum width of the column, before the gap to the next one.
    const fn min_width(self) -> usize {
        match self {
            Self::Number | Self::CarId | Self::DailyRate => 8,
            Self::CarName | Self::RentedBy => 18,
            Self::NumberOfDays | Self::DateRented => 13,
        }
    }

    fn value(self, number: usize, car: &Car, digits: usize) -> String {
        let rental = car.rental();
        match self {
            Self::Number => number.to_string(),
            Self::CarId => car.id().display(digits).to_string(),
            Self::CarName => car.name().to_string(),
            Self::DailyRate => car.daily_rate().to_string(),
            Self::RentedBy => rental.map(|r| r.customer.as_str().to_string()).unwrap_or_default(),
            Self::NumberOfDays => rental.map(|r| r.days.to_string()).unwrap_or_default(),
            Self::DateRented => rental
                .map(|r| r.since.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Renders `cars` as a fixed-width table.
///
/// The `Number` column is the 1-based position in `cars`, which is what
/// renting by number expects when `cars` is the available-only listing.
pub fn render_table(cars: &[Car], columns: &[Column], digits: usize) -> String {
    let data: Vec<Vec<String>> = cars
        .iter()
        .enumerate()
        .map(|(idx, car)| {
            columns
                .iter()
                .map(|column| column.value(idx + 1, car, digits))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(column.header().len())
                .max(column.min_width())
        })
        .collect();

    let mut out = String::new();
    let header = columns
        .iter()
        .zip(&widths)
        .map(|(column, &width)| format!("{:<width$}", column.header()))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", header.trim_end());

    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{rule}");

    for row in data {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }

    out
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRow<'a> {
    number: usize,
    car_id: String,
    car_name: &'a str,
    daily_rate: f64,
    rented_by: Option<&'a str>,
    number_of_days: Option<u32>,
    date_rented: Option<String>,
}

/// Renders `cars` as a pretty-printed JSON array.
pub fn render_json(cars: &[Car], digits: usize) -> anyhow::Result<String> {
    let rows: Vec<_> = cars
        .iter()
        .enumerate()
        .map(|(idx, car)| {
            let rental = car.rental();
            JsonRow {
                number: idx + 1,
                car_id: car.id().display(digits).to_string(),
                car_name: car.name(),
                daily_rate: car.daily_rate().get(),
                rented_by: rental.map(|r| r.customer.as_str()),
                number_of_days: rental.map(|r| r.days.get()),
                date_rented: rental.map(|r| r.since.format("%Y-%m-%d").to_string()),
            }
        })
        .collect();

    serde_json::to_string_pretty(&rows).context("failed to render json output")
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::NaiveDate;
    use non_empty_string::NonEmptyString;
    use rental::{CarId, DailyRate, Rental};

    use super::*;

    fn cars() -> Vec<Car> {
        let sedan = Car::new(
            CarId::FIRST,
            NonEmptyString::new("Sedan".to_string()).unwrap(),
            DailyRate::new(49.99).unwrap(),
        );
        let coupe = Car::new(
            "2".parse().unwrap(),
            NonEmptyString::new("Coupe".to_string()).unwrap(),
            DailyRate::new(80.5).unwrap(),
        )
        .with_rental(Some(Rental {
            customer: NonEmptyString::new("Alice".to_string()).unwrap(),
            days: NonZeroU32::new(3).unwrap(),
            since: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }));
        vec![sedan, coupe]
    }

    #[test]
    fn table_has_header_rule_and_rows() {
        let output = render_table(&cars(), &Column::ALL, 5);
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), 4);
        let headers: Vec<_> = lines[0].split_whitespace().collect();
        assert_eq!(
            headers,
            [
                "Number",
                "CarID",
                "CarName",
                "DailyRate",
                "RentedBy",
                "NumberOfDays",
                "DateRented"
            ]
        );
        assert!(lines[1].starts_with("--------"));
        assert_eq!(
            lines[2].split_whitespace().collect::<Vec<_>>(),
            ["1", "00001", "Sedan", "49.99"]
        );
        assert_eq!(
            lines[3].split_whitespace().collect::<Vec<_>>(),
            ["2", "00002", "Coupe", "80.5", "Alice", "3", "2025-03-14"]
        );
    }

    #[test]
    fn columns_line_up() {
        let output = render_table(&cars(), &Column::ALL, 5);
        let lines: Vec<_> = output.lines().collect();

        let name_at = lines[0].find("CarName").unwrap();
        assert_eq!(lines[2].find("Sedan").unwrap(), name_at);
        assert_eq!(lines[3].find("Coupe").unwrap(), name_at);
    }

    #[test]
    fn long_values_widen_their_column() {
        let mut cars = cars();
        cars.push(Car::new(
            "3".parse().unwrap(),
            NonEmptyString::new("An Extremely Long Station Wagon".to_string()).unwrap(),
            DailyRate::new(1.0).unwrap(),
        ));

        let output = render_table(&cars, &Column::ALL, 5);
        let lines: Vec<_> = output.lines().collect();
        let rate_at = lines[0].find("DailyRate").unwrap();
        assert!(rate_at > lines[0].find("CarName").unwrap() + 31);
        assert_eq!(lines[4].rfind('1'), Some(rate_at));
    }

    #[test]
    fn empty_listing_is_header_only() {
        let output = render_table(&[], &Column::ALL, 5);
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn json_marks_available_cars_with_nulls() {
        let output = render_json(&cars(), 5).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value[0]["carId"], "00001");
        assert!(value[0]["rentedBy"].is_null());
        assert_eq!(value[1]["number"], 2);
        assert_eq!(value[1]["rentedBy"], "Alice");
        assert_eq!(value[1]["dateRented"], "2025-03-14");
    }
}
