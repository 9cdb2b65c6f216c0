//! The interactive menu loop.

use std::{fmt, num::NonZeroU32};

use dialoguer::{Input, Select};
use non_empty_string::NonEmptyString;
use rental::{Availability, CarId, Config, DailyRate, DeletePolicy, RentalStore, StoreError};

use super::{
    listing::{self, Column},
    terminal::Colorize,
};

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    List,
    Rent,
    Return,
    Add,
    Delete,
    Exit,
}

impl Action {
    const ALL: [Self; 6] = [
        Self::List,
        Self::Rent,
        Self::Return,
        Self::Add,
        Self::Delete,
        Self::Exit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "List all cars",
            Self::Rent => "Rent a car",
            Self::Return => "Return a car",
            Self::Add => "Add a car",
            Self::Delete => "Delete a car",
            Self::Exit => "Exit",
        })
    }
}

/// Runs the menu until the user picks "Exit".
///
/// Errors from the rental table are reported and the loop carries on.
/// Terminal errors (e.g. stdin closed) end the loop.
pub fn run(store: &RentalStore, config: &Config) -> anyhow::Result<()> {
    loop {
        println!();
        let choice = Select::new()
            .with_prompt("Options")
            .items(&Action::ALL)
            .default(0)
            .interact()?;

        let action = Action::ALL[choice];
        tracing::debug!(?action, "menu selection");

        let outcome = match action {
            Action::List => list(store),
            Action::Rent => rent(store),
            Action::Return => return_car(store),
            Action::Add => add(store),
            Action::Delete => delete(store, config),
            Action::Exit => return Ok(()),
        };

        settle(outcome)?;
    }
}

/// Reports a failed table operation and swallows it.
///
/// Any other error is handed back so the loop can stop.
fn settle(outcome: anyhow::Result<()>) -> anyhow::Result<()> {
    match outcome {
        Err(e) if e.downcast_ref::<StoreError>().is_some() => {
            eprintln!("{}", format!("{e:#}").warning());
            Ok(())
        }
        other => other,
    }
}

fn list(store: &RentalStore) -> anyhow::Result<()> {
    let cars = store.cars(Availability::All)?;
    print!(
        "{}",
        listing::render_table(&cars, Column::for_terminal(), store.digits())
    );
    Ok(())
}

fn rent(store: &RentalStore) -> anyhow::Result<()> {
    let available = store.cars(Availability::AvailableOnly)?;
    if available.is_empty() {
        println!("{}", "No cars available for rent!".warning());
        return Ok(());
    }
    print!(
        "{}",
        listing::render_table(&available, Column::for_terminal(), store.digits())
    );

    let count = available.len();
    let selection: usize = Input::new()
        .with_prompt("Enter the number of the car you want to rent")
        .validate_with(move |n: &usize| -> Result<(), String> {
            if (1..=count).contains(n) {
                Ok(())
            } else {
                Err(format!("enter a number from 1 to {count}"))
            }
        })
        .interact_text()?;
    let customer = prompt_name("Enter your name")?;
    let days: NonZeroU32 = Input::new()
        .with_prompt("Enter number of days")
        .interact_text()?;

    report(
        store.rent_car(selection, customer, days)?,
        "Car rented successfully!",
        "Error renting car.",
    );
    Ok(())
}

fn return_car(store: &RentalStore) -> anyhow::Result<()> {
    let id: CarId = Input::new()
        .with_prompt("Enter car ID to return")
        .interact_text()?;

    report(
        store.return_car(id)?,
        "Car returned successfully!",
        "Error returning car.",
    );
    Ok(())
}

fn add(store: &RentalStore) -> anyhow::Result<()> {
    let name = prompt_name("Enter car name")?;
    let rate: DailyRate = Input::new()
        .with_prompt("Enter daily rate")
        .interact_text()?;

    let id = store.add_car(name, rate)?;
    println!(
        "{}",
        format!("Added car {}", id.display(store.digits())).success()
    );
    Ok(())
}

fn delete(store: &RentalStore, config: &Config) -> anyhow::Result<()> {
    let id: CarId = Input::new()
        .with_prompt("Enter car ID to delete")
        .interact_text()?;

    report(
        store.delete_car(id, DeletePolicy::new(config, false))?,
        "Car deleted successfully!",
        "Error deleting car.",
    );
    Ok(())
}

fn prompt_name(prompt: &str) -> anyhow::Result<NonEmptyString> {
    let name: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|s: &String| -> Result<(), &str> {
            if s.trim().is_empty() {
                Err("must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    NonEmptyString::new(name.trim().to_string())
        .map_err(|_| anyhow::anyhow!("name must not be empty"))
}

fn report(succeeded: bool, success: &str, failure: &str) {
    if succeeded {
        println!("{}", success.success());
    } else {
        println!("{}", failure.warning());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_offers_six_choices_ending_in_exit() {
        assert_eq!(Action::ALL.len(), 6);
        assert_eq!(Action::ALL[5], Action::Exit);
        assert_eq!(Action::ALL[0].to_string(), "List all cars");
    }

    #[test]
    fn store_errors_keep_the_menu_running() {
        let outcome = Err(StoreError::CarRented(CarId::FIRST).into());
        assert!(settle(outcome).is_ok());

        let outcome = Err(StoreError::SelectionOutOfRange {
            selection: 4,
            available: 1,
        }
        .into());
        assert!(settle(outcome).is_ok());
    }

    #[test]
    fn other_errors_end_the_menu() {
        let outcome = Err(anyhow::anyhow!("stdin closed"));
        let error = settle(outcome).unwrap_err();
        assert_eq!(error.to_string(), "stdin closed");
        assert!(error.downcast_ref::<StoreError>().is_none());
    }

    #[test]
    fn success_passes_through() {
        assert!(settle(Ok(())).is_ok());
    }
}
