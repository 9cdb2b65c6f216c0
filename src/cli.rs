use std::{num::NonZeroU32, path::PathBuf};

mod listing;
mod menu;
mod terminal;

use anyhow::Context;
use clap::{ArgAction, ArgGroup};
use listing::{Column, OutputFormat};
use non_empty_string::NonEmptyString;
use rental::{Availability, CarId, Config, DailyRate, DeletePolicy, RentalStore};
use terminal::Colorize;
use tracing::instrument;

/// Parse a name, rejecting blank input.
///
/// Surrounding whitespace is trimmed before checking.
fn parse_name(s: &str) -> Result<NonEmptyString, String> {
    NonEmptyString::new(s.trim().to_string()).map_err(|_| "name must not be empty".to_string())
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The rental table to use (overrides `data_file` in the config)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// The configuration file
    #[arg(short, long, default_value = "rental.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = Config::load_or_default(&self.config);
        let path = self.file.unwrap_or_else(|| config.data_file.clone());
        let store = RentalStore::open(&path, &config)
            .with_context(|| format!("failed to open rental table {}", path.display()))?;

        self.command.unwrap_or(Command::Menu).run(&store, &config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // stdout carries listings, so logs go to stderr
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Run the interactive menu (default)
    Menu,

    /// List cars
    List(List),

    /// Rent a car to a customer
    Rent(Rent),

    /// Return a rented car
    Return(Return),

    /// Add a car
    Add(Add),

    /// Delete a car
    Delete(Delete),

    /// Show the effective configuration
    Config,
}

impl Command {
    fn run(self, store: &RentalStore, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Menu => menu::run(store, config)?,
            Self::List(command) => command.run(store)?,
            Self::Rent(command) => command.run(store)?,
            Self::Return(command) => command.run(store)?,
            Self::Add(command) => command.run(store)?,
            Self::Delete(command) => command.run(store, config)?,
            Self::Config => show_config(config)?,
        }
        Ok(())
    }
}

fn show_config(config: &Config) -> anyhow::Result<()> {
    let rendered = config.to_toml().map_err(anyhow::Error::msg)?;
    print!("{rendered}");
    Ok(())
}

#[derive(Debug, clap::Parser)]
pub struct List {
    /// Show only cars that are not rented out
    #[arg(long, short)]
    available: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl List {
    #[instrument(level = "debug", skip(store))]
    fn run(self, store: &RentalStore) -> anyhow::Result<()> {
        let availability = if self.available {
            Availability::AvailableOnly
        } else {
            Availability::All
        };
        let cars = store.cars(availability)?;

        match self.output {
            OutputFormat::Table => print!(
                "{}",
                listing::render_table(&cars, Column::for_terminal(), store.digits())
            ),
            OutputFormat::Json => println!("{}", listing::render_json(&cars, store.digits())?),
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
#[command(group(ArgGroup::new("target").required(true).args(["number", "id"])))]
pub struct Rent {
    /// The car's number in `list --available`
    #[arg(long, short)]
    number: Option<usize>,

    /// The ID of the car to rent
    #[arg(long)]
    id: Option<CarId>,

    /// The customer's name
    #[arg(value_parser = parse_name)]
    customer: NonEmptyString,

    /// The number of days the car is rented for
    days: NonZeroU32,
}

impl Rent {
    #[instrument(skip(store))]
    fn run(self, store: &RentalStore) -> anyhow::Result<()> {
        let rented = match (self.number, self.id) {
            (_, Some(id)) => store.rent_car_by_id(
                id,
                self.customer,
                self.days,
                chrono::Local::now().date_naive(),
            )?,
            (Some(number), None) => {
                if store.available_cars()?.is_empty() {
                    println!("{}", "No cars available for rent!".warning());
                    return Ok(());
                }
                store.rent_car(number, self.customer, self.days)?
            }
            (None, None) => unreachable!("clap requires --number or --id"),
        };

        if rented {
            println!("{}", "Car rented successfully!".success());
            Ok(())
        } else {
            anyhow::bail!("Error renting car.")
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Return {
    /// The ID of the car to return
    id: CarId,
}

impl Return {
    #[instrument(skip(store))]
    fn run(self, store: &RentalStore) -> anyhow::Result<()> {
        if store.return_car(self.id)? {
            println!("{}", "Car returned successfully!".success());
            Ok(())
        } else {
            anyhow::bail!(
                "Error returning car: {} is not rented out",
                self.id.display(store.digits())
            )
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The car's display name
    #[arg(value_parser = parse_name)]
    name: NonEmptyString,

    /// The price per day
    rate: DailyRate,
}

impl Add {
    #[instrument(skip(store))]
    fn run(self, store: &RentalStore) -> anyhow::Result<()> {
        let id = store.add_car(self.name, self.rate)?;
        println!(
            "{}",
            format!("Added car {}", id.display(store.digits())).success()
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The ID of the car to delete
    id: CarId,

    /// Delete the car even if it is rented out
    #[arg(long)]
    force: bool,
}

impl Delete {
    #[instrument(skip(store, config))]
    fn run(self, store: &RentalStore, config: &Config) -> anyhow::Result<()> {
        if store.delete_car(self.id, DeletePolicy::new(config, self.force))? {
            println!("{}", "Car deleted successfully!".success());
            Ok(())
        } else {
            anyhow::bail!(
                "Error deleting car: {} not found",
                self.id.display(store.digits())
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rental::StoreError;

    use super::*;

    #[test]
    fn no_command_means_menu() {
        let cli = Cli::try_parse_from(["rental"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("rental.toml"));
    }

    #[test]
    fn parses_add() {
        let cli = Cli::try_parse_from(["rental", "add", "Sedan", "49.99"]).unwrap();
        let Some(Command::Add(add)) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(add.name.as_str(), "Sedan");
        assert_eq!(add.rate, DailyRate::new(49.99).unwrap());
    }

    #[test]
    fn rejects_negative_rate() {
        assert!(Cli::try_parse_from(["rental", "add", "Sedan", "--", "-5"]).is_err());
    }

    #[test]
    fn rejects_blank_name() {
        assert!(Cli::try_parse_from(["rental", "add", " ", "10"]).is_err());
    }

    #[test]
    fn rent_needs_number_or_id() {
        assert!(Cli::try_parse_from(["rental", "rent", "Alice", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["rental", "rent", "--number", "1", "--id", "1", "Alice", "3"])
                .is_err()
        );

        let cli = Cli::try_parse_from(["rental", "rent", "-n", "2", "Alice", "3"]).unwrap();
        let Some(Command::Rent(rent)) = cli.command else {
            panic!("expected rent");
        };
        assert_eq!(rent.number, Some(2));
        assert_eq!(rent.customer.as_str(), "Alice");
        assert_eq!(rent.days.get(), 3);
    }

    #[test]
    fn rent_rejects_zero_days() {
        assert!(Cli::try_parse_from(["rental", "rent", "--id", "1", "Alice", "0"]).is_err());
    }

    #[test]
    fn delete_accepts_unpadded_id() {
        let cli = Cli::try_parse_from(["rental", "delete", "7", "--force"]).unwrap();
        let Some(Command::Delete(delete)) = cli.command else {
            panic!("expected delete");
        };
        assert_eq!(delete.id.to_string(), "00007");
        assert!(delete.force);
    }

    #[test]
    fn global_file_flag() {
        let cli = Cli::try_parse_from(["rental", "list", "--file", "fleet.csv", "-a"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("fleet.csv")));
        let Some(Command::List(list)) = cli.command else {
            panic!("expected list");
        };
        assert!(list.available);
        assert_eq!(list.output, OutputFormat::Table);
    }

    fn open(tmp: &tempfile::TempDir) -> RentalStore {
        RentalStore::open(tmp.path().join("rental_data.csv"), &Config::default()).unwrap()
    }

    fn name(s: &str) -> NonEmptyString {
        NonEmptyString::new(s.to_string()).unwrap()
    }

    fn add(store: &RentalStore, car: &str) -> CarId {
        Add {
            name: name(car),
            rate: DailyRate::new(45.0).unwrap(),
        }
        .run(store)
        .unwrap();
        *store.list_cars(Availability::All).unwrap().last().unwrap()
    }

    fn rent(id: CarId) -> Rent {
        Rent {
            number: None,
            id: Some(id),
            customer: name("Alice"),
            days: NonZeroU32::new(3).unwrap(),
        }
    }

    #[test]
    fn add_appends_an_available_car() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);

        let sedan = add(&store, "Sedan");

        let car = store.get(sedan).unwrap().unwrap();
        assert_eq!(car.name(), "Sedan");
        assert!(car.is_available());
    }

    #[test]
    fn rent_by_number_with_no_cars_available() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);

        let command = Rent {
            number: Some(1),
            id: None,
            customer: name("Alice"),
            days: NonZeroU32::new(3).unwrap(),
        };
        command.run(&store).unwrap();

        assert!(store.cars(Availability::All).unwrap().is_empty());
    }

    #[test]
    fn rent_by_number_picks_from_available_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        let sedan = add(&store, "Sedan");
        let coupe = add(&store, "Coupe");
        rent(sedan).run(&store).unwrap();

        let command = Rent {
            number: Some(1),
            id: None,
            customer: name("Bob"),
            days: NonZeroU32::new(2).unwrap(),
        };
        command.run(&store).unwrap();

        let rental = store.get(coupe).unwrap().unwrap().rental().cloned().unwrap();
        assert_eq!(rental.customer.as_str(), "Bob");
        assert!(store.available_cars().unwrap().is_empty());
    }

    #[test]
    fn rent_out_of_range_number_is_a_store_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        add(&store, "Sedan");

        let command = Rent {
            number: Some(2),
            id: None,
            customer: name("Alice"),
            days: NonZeroU32::new(3).unwrap(),
        };
        let error = command.run(&store).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<StoreError>(),
            Some(StoreError::SelectionOutOfRange {
                selection: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn rent_by_id_twice_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        let sedan = add(&store, "Sedan");

        rent(sedan).run(&store).unwrap();
        assert!(!store.get(sedan).unwrap().unwrap().is_available());

        let error = rent(sedan).run(&store).unwrap_err();
        assert_eq!(error.to_string(), "Error renting car.");
    }

    #[test]
    fn return_needs_a_rented_car() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        let sedan = add(&store, "Sedan");

        assert!(Return { id: sedan }.run(&store).is_err());

        rent(sedan).run(&store).unwrap();
        Return { id: sedan }.run(&store).unwrap();
        assert!(store.get(sedan).unwrap().unwrap().is_available());
    }

    #[test]
    fn delete_missing_car_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        add(&store, "Sedan");

        let command = Delete {
            id: "9".parse().unwrap(),
            force: false,
        };
        let error = command.run(&store, &Config::default()).unwrap_err();

        assert!(error.to_string().contains("00009 not found"));
        assert_eq!(store.cars(Availability::All).unwrap().len(), 1);
    }

    #[test]
    fn delete_refuses_rented_car_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        let sedan = add(&store, "Sedan");
        rent(sedan).run(&store).unwrap();

        let command = Delete {
            id: sedan,
            force: false,
        };
        let error = command.run(&store, &Config::default()).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<StoreError>(),
            Some(StoreError::CarRented(rented)) if *rented == sedan
        ));
        assert!(store.get(sedan).unwrap().is_some());
    }

    #[test]
    fn delete_rented_car_with_force() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        let sedan = add(&store, "Sedan");
        rent(sedan).run(&store).unwrap();

        let command = Delete {
            id: sedan,
            force: true,
        };
        command.run(&store, &Config::default()).unwrap();

        assert!(store.get(sedan).unwrap().is_none());
    }

    #[test]
    fn delete_rented_car_when_config_allows_it() {
        let tmp = tempfile::tempdir().unwrap();
        let store = open(&tmp);
        let sedan = add(&store, "Sedan");
        rent(sedan).run(&store).unwrap();

        let mut config = Config::default();
        config.allow_delete_rented = true;
        let command = Delete {
            id: sedan,
            force: false,
        };
        command.run(&store, &config).unwrap();

        assert!(store.get(sedan).unwrap().is_none());
    }
}
