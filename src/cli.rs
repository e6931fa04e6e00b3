//! # CLI Adapter
//!
//! The command-line front end. Parses arguments, turns them into
//! `core::Action` values, and prints what comes back. This is the only
//! module that knows about clap or the terminal.
//!
//! Nothing is persisted: every invocation starts from the seed fleet and
//! the configured balance, so `book --then-cancel` is the way to see a
//! refund round-trip.

use clap::{Parser, Subcommand};
use log::info;
use std::io::{self, BufRead, Write};
use uuid::Uuid;

use crate::core::car::{Car, CarKey};
use crate::core::catalog::SortKey;
use crate::core::config::{Overrides, ResolvedConfig};
use crate::core::pricing::{CustomerDetails, DEFAULT_DRIVER_AGE, credits};
use crate::core::{Action, App, Effect, update};

#[derive(Parser, Debug)]
#[command(name = "rentacar", about = "Browse the rental fleet and book a car")]
pub struct Args {
    /// Starting credit balance
    #[arg(long, global = true)]
    pub balance: Option<f64>,

    /// Maximum total cost of a single booking
    #[arg(long, global = true)]
    pub max_rental_cost: Option<f64>,

    /// Order of the car list
    #[arg(short, long, global = true, value_enum)]
    pub sort: Option<SortKey>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            starting_balance: self.balance,
            max_rental_cost: self.max_rental_cost,
            sort: self.sort,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the cars available for rent
    List {
        /// Case-insensitive filter on make or model
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle cars as favorites and print the favorites list
    Favorites {
        /// Cars by display name, e.g. "Tesla Model 3"
        cars: Vec<String>,
    },
    /// Show the price breakdown for a rental
    Quote {
        car: String,
        #[arg(short, long, default_value_t = 1)]
        days: u8,
        #[arg(short, long)]
        insurance: bool,
    },
    /// Book a car
    Book(BookArgs),
}

#[derive(clap::Args, Debug)]
pub struct BookArgs {
    pub car: String,
    #[arg(short, long, default_value_t = 1)]
    pub days: u8,
    #[arg(short, long)]
    pub insurance: bool,
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub license: String,
    #[arg(long, default_value_t = DEFAULT_DRIVER_AGE)]
    pub age: u8,
    /// Confirm without asking
    #[arg(short, long)]
    pub yes: bool,
    /// Cancel the booking right after confirming it (refund round-trip)
    #[arg(long)]
    pub then_cancel: bool,
}

impl BookArgs {
    fn customer(&self) -> CustomerDetails {
        CustomerDetails {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            license: self.license.clone(),
            age: self.age,
        }
    }
}

/// Runs one command against a fresh `App`. Returns `false` when the
/// command was rejected (the reason has been printed).
pub fn run(args: Args, config: &ResolvedConfig) -> io::Result<bool> {
    let mut app = App::from_config(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(&mut app, args.command, &mut stdin.lock(), &mut stdout.lock())
}

pub fn execute(
    app: &mut App,
    command: Command,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<bool> {
    let result = match command {
        Command::List { search, json } => list(app, search.as_deref(), json, out),
        Command::Favorites { cars } => favorites(app, &cars, out),
        Command::Quote {
            car,
            days,
            insurance,
        } => quote(app, &car, days, insurance, out),
        Command::Book(book_args) => book(app, &book_args, input, out),
    };
    match result {
        Ok(Ok(())) => Ok(true),
        Ok(Err(message)) => {
            info!("Command rejected: {}", message);
            writeln!(out, "Error: {message}")?;
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Outer `Err` is an I/O failure, inner `Err` a rejected action.
type Outcome = io::Result<Result<(), String>>;

/// Applies `action`, turning a rejection into `Err(message)`.
fn step(app: &mut App, action: Action) -> Result<Effect, String> {
    let effect = update(app, action);
    match app.error.take() {
        Some(message) => Err(message),
        None => Ok(effect),
    }
}

fn resolve_car(app: &App, display_name: &str) -> Result<CarKey, String> {
    app.catalog
        .find_by_display_name(display_name)
        .map(Car::key)
        .ok_or_else(|| format!("Unknown car {display_name:?}; see `rentacar list`"))
}

fn list(app: &mut App, search: Option<&str>, json: bool, out: &mut impl Write) -> Outcome {
    if let Some(query) = search {
        if let Err(message) = step(app, Action::Search(query.to_string())) {
            return Ok(Err(message));
        }
    }

    if json {
        let body = serde_json::to_string_pretty(&app.catalog.view())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(out, "{body}")?;
        return Ok(Ok(()));
    }

    writeln!(
        out,
        "Balance: {} ({})   Sorted by: {}",
        app.wallet.display(),
        app.wallet.tier().label(),
        app.catalog.sort_key().label()
    )?;
    let Some(counter) = app.catalog.counter_label() else {
        writeln!(out, "No cars available")?;
        return Ok(Ok(()));
    };
    writeln!(out, "{counter}")?;
    for (i, car) in app.catalog.view().iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {}{} ({})  ★ {:.1}  {}  {}",
            i + 1,
            car.display_name(),
            if car.is_favorite() { " ♥" } else { "" },
            car.year,
            car.rating,
            car.formatted_kilometres(),
            car.formatted_cost()
        )?;
        writeln!(out, "    {}", car.features().join(" • "))?;
    }
    Ok(Ok(()))
}

fn favorites(app: &mut App, cars: &[String], out: &mut impl Write) -> Outcome {
    for name in cars {
        let key = match resolve_car(app, name) {
            Ok(key) => key,
            Err(message) => return Ok(Err(message)),
        };
        let toggled = step(app, Action::SelectCar(key.clone()))
            .and_then(|_| step(app, Action::ToggleFavorite));
        if let Err(message) = toggled {
            return Ok(Err(message));
        }
        writeln!(out, "{}: {}", app.status_message, key)?;
    }
    match app.catalog.favorites_listing() {
        Some(listing) => writeln!(out, "Favorites:\n{listing}")?,
        None => writeln!(out, "No favorites yet")?,
    }
    Ok(Ok(()))
}

/// Selects the car and opens a booking with the given days and insurance.
fn open_booking(app: &mut App, car: &str, days: u8, insurance: bool) -> Result<(), String> {
    let key = resolve_car(app, car)?;
    step(app, Action::SelectCar(key))?;
    step(app, Action::StartBooking)?;
    step(app, Action::SetDays(days))?;
    step(app, Action::SetInsurance(insurance))?;
    Ok(())
}

fn quote(app: &mut App, car: &str, days: u8, insurance: bool, out: &mut impl Write) -> Outcome {
    if let Err(message) = open_booking(app, car, days, insurance) {
        return Ok(Err(message));
    }
    if let Some(breakdown) = app.price_breakdown() {
        writeln!(out, "{breakdown}")?;
    }
    Ok(Ok(()))
}

fn book(
    app: &mut App,
    args: &BookArgs,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Outcome {
    let submitted = open_booking(app, &args.car, args.days, args.insurance)
        .and_then(|_| step(app, Action::EditCustomer(args.customer())))
        .and_then(|_| step(app, Action::SubmitBooking));
    let summary = match submitted {
        Ok(Effect::AwaitConfirmation(summary)) => summary,
        Ok(other) => return Ok(Err(format!("unexpected result: {other:?}"))),
        Err(message) => return Ok(Err(message)),
    };

    writeln!(out, "{summary}")?;
    let confirmed = args.yes || ask_yes_no(input, out)?;
    if !confirmed {
        if let Err(message) = step(app, Action::CancelBooking) {
            return Ok(Err(message));
        }
        writeln!(out, "{}", app.status_message)?;
        return Ok(Ok(()));
    }

    let reference = match step(app, Action::ConfirmBooking) {
        Ok(Effect::Booked(reference)) => reference,
        Ok(other) => return Ok(Err(format!("unexpected result: {other:?}"))),
        Err(message) => return Ok(Err(message)),
    };
    write_receipt(app, reference, out)?;
    writeln!(out, "{}", app.status_message)?;

    if args.then_cancel {
        let refunded = step(app, Action::ReopenBooking(reference))
            .and_then(|_| step(app, Action::CancelBooking));
        match refunded {
            Ok(Effect::Refunded(amount)) => {
                writeln!(out, "{}", app.status_message)?;
                writeln!(
                    out,
                    "Refunded {}; balance is {}",
                    credits(amount),
                    app.wallet.display()
                )?;
            }
            Ok(other) => return Ok(Err(format!("unexpected result: {other:?}"))),
            Err(message) => return Ok(Err(message)),
        }
    }
    Ok(Ok(()))
}

fn write_receipt(app: &App, reference: Uuid, out: &mut impl Write) -> io::Result<()> {
    let Some(receipt) = app.receipt(reference) else {
        return Ok(());
    };
    writeln!(out, "Booking reference: {}", receipt.reference)?;
    writeln!(
        out,
        "{} for {} day(s), booked {}",
        receipt.car,
        receipt.days,
        receipt.booked_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out, "Charged: {}", credits(receipt.quote.total))
}

fn ask_yes_no(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<bool> {
    write!(out, "[y/N] ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
