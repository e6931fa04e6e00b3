//! # Actions
//!
//! Everything that can happen in Rent-a-car becomes an `Action`.
//! User types in the search box? That's `Action::Search(text)`.
//! User taps "Confirm" in the dialog? That's `Action::ConfirmBooking`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` telling the adapter what to do next
//! (show the confirm dialog, report a receipt, quit). No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Rejected actions never panic: they set `app.error` and return
//! `Effect::None`, and the user corrects the input and tries again.

use log::{debug, warn};
use uuid::Uuid;

use crate::core::booking::BookingSession;
use crate::core::car::CarKey;
use crate::core::catalog::SortKey;
use crate::core::pricing::{CustomerDetails, RentalDays};
use crate::core::state::App;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Catalog screen
    Search(String),
    Sort(SortKey),
    NextCar,
    PreviousCar,
    SelectCar(CarKey),
    ToggleFavorite,
    StartBooking,

    // Booking screen
    SetDays(u8),
    SetInsurance(bool),
    EditCustomer(CustomerDetails),
    SubmitBooking,
    ConfirmBooking,
    CancelBooking,

    /// Reopen a confirmed booking so it can be cancelled for a refund.
    ReopenBooking(Uuid),

    Quit,
}

/// What the adapter should do after an `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Show the summary and ask yes/no; answer with Confirm/CancelBooking.
    AwaitConfirmation(String),
    /// Booking committed; the receipt is in `app.receipts`.
    Booked(Uuid),
    /// Booking cancelled with this many credits returned.
    Refunded(f64),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("Action: {:?}", action);
    app.error = None;

    match action {
        Action::Search(query) => {
            app.catalog.set_search_query(&query);
            if app.catalog.is_empty() {
                app.status_message = "No cars found matching your search".to_string();
            }
            Effect::None
        }
        Action::Sort(key) => {
            app.catalog.set_sort_key(key);
            app.status_message = format!("Sorted by: {}", key.label());
            Effect::None
        }
        Action::NextCar => {
            app.catalog.move_next();
            Effect::None
        }
        Action::PreviousCar => {
            app.catalog.move_previous();
            Effect::None
        }
        Action::SelectCar(key) => {
            if !app.catalog.select(&key) {
                return reject(app, format!("{key} is not in the current list"));
            }
            Effect::None
        }
        Action::ToggleFavorite => {
            let Some(key) = app.catalog.current_car().map(|c| c.key()) else {
                return reject(app, "No cars available".to_string());
            };
            if let Some(now) = app.catalog.toggle_favorite(&key) {
                app.status_message = if now {
                    "Added to favorites".to_string()
                } else {
                    "Removed from favorites".to_string()
                };
            }
            Effect::None
        }
        Action::StartBooking => {
            if app.booking.is_some() {
                return reject(app, "A booking is already in progress".to_string());
            }
            let Some(car) = app.catalog.current_car() else {
                return reject(app, "No cars available".to_string());
            };
            match BookingSession::open(car) {
                Ok(session) => {
                    app.booking = Some(session);
                    Effect::None
                }
                Err(e) => reject(app, e.to_string()),
            }
        }
        Action::SetDays(days) => {
            let days = match RentalDays::new(days) {
                Ok(d) => d,
                Err(e) => return reject(app, e.to_string()),
            };
            with_session(app, |session| session.set_days(days).map(|_| ()))
        }
        Action::SetInsurance(on) => {
            with_session(app, |session| session.set_insurance(on).map(|_| ()))
        }
        Action::EditCustomer(customer) => {
            with_session(app, |session| session.set_customer(customer))
        }
        Action::SubmitBooking => {
            let Some(session) = app.booking.as_mut() else {
                return reject(app, "No booking in progress".to_string());
            };
            match session.submit(&app.wallet, app.max_rental_cost) {
                Ok(_) => {
                    let summary = session.confirmation_summary(app.wallet.balance());
                    Effect::AwaitConfirmation(summary)
                }
                Err(e) => reject(app, e.to_string()),
            }
        }
        Action::ConfirmBooking => {
            let Some(session) = app.booking.as_mut() else {
                return reject(app, "No booking in progress".to_string());
            };
            match session.confirm(&mut app.catalog, &mut app.wallet) {
                Ok(receipt) => {
                    let reference = receipt.reference;
                    app.receipts.push(receipt);
                    app.booking = None;
                    app.status_message = format!(
                        "Car rented successfully! Remaining balance: {}",
                        app.wallet.display()
                    );
                    Effect::Booked(reference)
                }
                Err(e) => reject(app, e.to_string()),
            }
        }
        Action::CancelBooking => {
            let Some(session) = app.booking.as_mut() else {
                return reject(app, "No booking in progress".to_string());
            };
            let reopened = session.booked().map(|r| r.reference);
            match session.cancel(&mut app.catalog, &mut app.wallet) {
                Ok(refund) => {
                    app.booking = None;
                    match (refund, reopened) {
                        (Some(amount), Some(reference)) => {
                            app.receipts.retain(|r| r.reference != reference);
                            app.status_message =
                                "Booking cancelled. Car is now available again!".to_string();
                            Effect::Refunded(amount)
                        }
                        _ => {
                            app.status_message = "Booking cancelled".to_string();
                            Effect::None
                        }
                    }
                }
                Err(e) => reject(app, e.to_string()),
            }
        }
        Action::ReopenBooking(reference) => {
            if app.booking.is_some() {
                return reject(app, "A booking is already in progress".to_string());
            }
            let Some(receipt) = app.receipt(reference).cloned() else {
                return reject(app, format!("No booking {reference}"));
            };
            let Some(car) = app.catalog.get(&receipt.car) else {
                return reject(app, format!("No car {}", receipt.car));
            };
            app.booking = Some(BookingSession::reopen(receipt, car));
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn with_session<E: std::fmt::Display>(
    app: &mut App,
    edit: impl FnOnce(&mut BookingSession) -> Result<(), E>,
) -> Effect {
    let Some(session) = app.booking.as_mut() else {
        return reject(app, "No booking in progress".to_string());
    };
    match edit(session) {
        Ok(()) => Effect::None,
        Err(e) => reject(app, e.to_string()),
    }
}

fn reject(app: &mut App, message: String) -> Effect {
    warn!("Rejected: {}", message);
    app.error = Some(message);
    Effect::None
}
