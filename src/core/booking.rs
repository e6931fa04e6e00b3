//! # Booking Session
//!
//! One booking attempt for one car.
//!
//! ```text
//!            set_days / set_insurance / set_customer   (re-quote, drop approval)
//!               ┌──────┐
//!               ▼      │
//! open() ──► Editing ──┘
//!               │ submit() ok            (approval held, caller shows summary)
//!               ▼
//!            Editing* ──confirm()──► Confirmed   (car rented, wallet debited)
//!               │
//!               └──────cancel()───► Cancelled   (refund if reopened from a receipt)
//! ```
//!
//! The "are you sure?" dialog is not a state here: the caller keeps the
//! session between `submit()` and `confirm()`/`cancel()`. Terminal sessions
//! reject everything with [`BookingError::Finished`].
//!
//! A confirmed booking yields a [`Receipt`] with the quote frozen at confirm
//! time. Cancelling later goes through [`BookingSession::reopen`], which
//! refunds exactly `receipt.quote.total`.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::core::car::{Car, CarKey};
use crate::core::catalog::CarCatalog;
use crate::core::pricing::{
    self, BookingQuote, CustomerDetails, RentalDays, ValidationError, credits,
};
use crate::core::wallet::Wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Editing,
    Confirmed,
    Cancelled,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Editing => "editing",
            SessionState::Confirmed => "confirmed",
            SessionState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A committed booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub reference: Uuid,
    pub car: CarKey,
    pub customer_name: String,
    pub days: RentalDays,
    pub insurance: bool,
    pub quote: BookingQuote,
    pub booked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingError {
    /// A customer field, the rental limit or the balance check failed.
    Invalid(ValidationError),
    /// `confirm()` without a successful `submit()` since the last edit.
    NotSubmitted,
    /// The session already reached a terminal state.
    Finished(SessionState),
    /// The car is rented (or missing from the catalog).
    CarUnavailable(CarKey),
    /// The session was reopened from a receipt; it can only be cancelled.
    AlreadyBooked(Uuid),
    /// The receipt's charge was already refunded.
    NotBooked(Uuid),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::Invalid(e) => write!(f, "{e}"),
            BookingError::NotSubmitted => {
                write!(f, "booking must be submitted before it can be confirmed")
            }
            BookingError::Finished(state) => write!(f, "booking session is already {state}"),
            BookingError::CarUnavailable(_) => write!(f, "This car is already rented!"),
            BookingError::AlreadyBooked(reference) => {
                write!(f, "booking {reference} is already confirmed and can only be cancelled")
            }
            BookingError::NotBooked(reference) => {
                write!(f, "booking {reference} has already been cancelled")
            }
        }
    }
}

impl std::error::Error for BookingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookingError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for BookingError {
    fn from(e: ValidationError) -> Self {
        BookingError::Invalid(e)
    }
}

#[derive(Debug, Clone, Copy)]
struct Approval {
    quote: BookingQuote,
    max_rental_limit: f64,
}

#[derive(Debug, Clone)]
pub struct BookingSession {
    car: Car,
    days: RentalDays,
    insurance: bool,
    customer: CustomerDetails,
    quote: BookingQuote,
    approval: Option<Approval>,
    state: SessionState,
    booked: Option<Receipt>,
}

impl BookingSession {
    /// Starts a fresh booking for `car` (1 day, no insurance).
    pub fn open(car: &Car) -> Result<Self, BookingError> {
        if car.is_rented() {
            return Err(BookingError::CarUnavailable(car.key()));
        }
        let days = RentalDays::default();
        debug!("Booking opened for {}", car.display_name());
        Ok(Self {
            car: car.clone(),
            days,
            insurance: false,
            customer: CustomerDetails::default(),
            quote: pricing::quote(car.daily_rental_cost, days, false),
            approval: None,
            state: SessionState::Editing,
            booked: None,
        })
    }

    /// Reopens a confirmed booking so it can be cancelled and refunded.
    pub fn reopen(receipt: Receipt, car: &Car) -> Self {
        debug_assert!(car.is_key(&receipt.car), "receipt is for a different car");
        debug!("Booking {} reopened for {}", receipt.reference, receipt.car);
        Self {
            car: car.clone(),
            days: receipt.days,
            insurance: receipt.insurance,
            customer: CustomerDetails {
                name: receipt.customer_name.clone(),
                ..Default::default()
            },
            quote: receipt.quote,
            approval: None,
            state: SessionState::Editing,
            booked: Some(receipt),
        }
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn days(&self) -> RentalDays {
        self.days
    }

    pub fn insurance(&self) -> bool {
        self.insurance
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    pub fn quote(&self) -> &BookingQuote {
        &self.quote
    }

    /// The receipt this session was reopened from, if any.
    pub fn booked(&self) -> Option<&Receipt> {
        self.booked.as_ref()
    }

    /// True between a successful `submit()` and the next edit.
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.state == SessionState::Editing && self.approval.is_some()
    }

    pub fn set_days(&mut self, days: RentalDays) -> Result<&BookingQuote, BookingError> {
        self.ensure_editable()?;
        self.days = days;
        self.requote();
        Ok(&self.quote)
    }

    pub fn set_insurance(&mut self, insurance: bool) -> Result<&BookingQuote, BookingError> {
        self.ensure_editable()?;
        self.insurance = insurance;
        self.requote();
        Ok(&self.quote)
    }

    pub fn set_customer(&mut self, customer: CustomerDetails) -> Result<(), BookingError> {
        self.ensure_editable()?;
        self.customer = customer;
        self.approval = None;
        Ok(())
    }

    /// Validates customer fields, then the quote against limit and balance.
    /// On success the quote is held for `confirm()`.
    pub fn submit(
        &mut self,
        wallet: &Wallet,
        max_rental_limit: f64,
    ) -> Result<BookingQuote, BookingError> {
        self.ensure_editable()?;
        self.approval = None;

        if let Err(e) = pricing::validate_customer(&self.customer) {
            debug!("Submit rejected: {}", e);
            return Err(e.into());
        }
        if let Err(e) = pricing::validate(&self.quote, wallet.balance(), max_rental_limit) {
            debug!("Submit rejected: {}", e);
            return Err(e.into());
        }

        self.approval = Some(Approval {
            quote: self.quote,
            max_rental_limit,
        });
        info!(
            "Booking for {} submitted: {} day(s), total {:.3}",
            self.car.display_name(),
            self.days,
            self.quote.total
        );
        Ok(self.quote)
    }

    /// Commits the approved booking: marks the car rented and debits the
    /// wallet. Nothing is mutated unless every check passes.
    pub fn confirm(
        &mut self,
        catalog: &mut CarCatalog,
        wallet: &mut Wallet,
    ) -> Result<Receipt, BookingError> {
        self.ensure_editable()?;
        let Some(approval) = self.approval else {
            return Err(BookingError::NotSubmitted);
        };

        let key = self.car.key();
        if !catalog.get(&key).is_some_and(Car::is_available) {
            return Err(BookingError::CarUnavailable(key));
        }
        pricing::validate(&approval.quote, wallet.balance(), approval.max_rental_limit)?;

        let receipt = Receipt {
            reference: Uuid::new_v4(),
            car: key,
            customer_name: self.customer.name.trim().to_string(),
            days: self.days,
            insurance: self.insurance,
            quote: approval.quote,
            booked_at: Utc::now(),
        };
        catalog.mark_rented(&receipt.car);
        wallet.debit(receipt.reference, receipt.quote.total);
        self.state = SessionState::Confirmed;
        self.approval = None;
        info!(
            "Booking {} confirmed for {}, remaining balance {:.3}",
            receipt.reference,
            receipt.car,
            wallet.balance()
        );
        Ok(receipt)
    }

    /// Ends the session. A reopened booking releases the car and refunds the
    /// frozen total; returns the refunded amount. A receipt whose charge is
    /// no longer outstanding is refused with `NotBooked` and nothing changes.
    pub fn cancel(
        &mut self,
        catalog: &mut CarCatalog,
        wallet: &mut Wallet,
    ) -> Result<Option<f64>, BookingError> {
        if self.state != SessionState::Editing {
            return Err(BookingError::Finished(self.state));
        }

        let refunded = match &self.booked {
            Some(receipt) => {
                // The car and the money move together or not at all.
                if !wallet.holds(receipt.reference) {
                    warn!("Booking {} has no outstanding charge", receipt.reference);
                    return Err(BookingError::NotBooked(receipt.reference));
                }
                let was_rented = catalog.mark_available(&receipt.car);
                debug_assert!(was_rented, "{} was charged but not rented", receipt.car);
                wallet.refund(receipt.reference)
            }
            None => None,
        };

        self.state = SessionState::Cancelled;
        self.approval = None;
        info!(
            "Booking for {} cancelled (refund: {:?})",
            self.car.display_name(),
            refunded
        );
        Ok(refunded)
    }

    /// The text shown in the confirm dialog.
    pub fn confirmation_summary(&self, balance: f64) -> String {
        let mut lines = vec![
            "Booking Confirmation".to_string(),
            String::new(),
            format!("Car: {} ({})", self.car.display_name(), self.car.year),
            format!("Customer: {}", self.customer.name.trim()),
            format!("Email: {}", self.customer.email.trim()),
            format!("Phone: {}", self.customer.phone.trim()),
            format!("Rental Duration: {} day(s)", self.days),
            format!("Daily Rate: {} credits", self.car.daily_rental_cost as i64),
        ];
        if self.insurance {
            lines.push("Insurance: Yes".to_string());
        }
        lines.push(String::new());
        lines.push(format!("Total Cost: {}", credits(self.quote.total)));
        lines.push(format!(
            "Remaining Balance: {}",
            credits(balance - self.quote.total)
        ));
        lines.push(String::new());
        lines.push("Confirm this booking?".to_string());
        lines.join("\n")
    }

    fn ensure_editable(&self) -> Result<(), BookingError> {
        if self.state != SessionState::Editing {
            return Err(BookingError::Finished(self.state));
        }
        if let Some(receipt) = &self.booked {
            return Err(BookingError::AlreadyBooked(receipt.reference));
        }
        Ok(())
    }

    fn requote(&mut self) {
        self.quote = pricing::quote(self.car.daily_rental_cost, self.days, self.insurance);
        self.approval = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pricing::CustomerField;
    use crate::test_support::{approx_eq, camry, names, valid_customer};

    fn days(n: u8) -> RentalDays {
        RentalDays::new(n).unwrap()
    }

    fn open_camry(catalog: &CarCatalog) -> BookingSession {
        BookingSession::open(catalog.get(&camry()).unwrap()).unwrap()
    }

    fn ready_session(catalog: &CarCatalog) -> BookingSession {
        let mut session = open_camry(catalog);
        session.set_days(days(3)).unwrap();
        session.set_insurance(true).unwrap();
        session.set_customer(valid_customer()).unwrap();
        session
    }

    #[test]
    fn test_open_defaults() {
        let catalog = CarCatalog::seeded();
        let session = open_camry(&catalog);
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.days().get(), 1);
        assert!(!session.insurance());
        assert!(approx_eq(session.quote().total, 49.5));
        assert!(!session.is_awaiting_confirmation());
    }

    #[test]
    fn test_quote_follows_inputs() {
        let catalog = CarCatalog::seeded();
        let mut session = open_camry(&catalog);
        assert!(approx_eq(session.set_days(days(3)).unwrap().total, 148.5));
        assert!(approx_eq(session.set_insurance(true).unwrap().total, 170.775));
        assert!(approx_eq(session.set_insurance(false).unwrap().total, 148.5));
    }

    #[test]
    fn test_confirm_requires_submit() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();
        let mut session = ready_session(&catalog);
        assert_eq!(
            session.confirm(&mut catalog, &mut wallet),
            Err(BookingError::NotSubmitted)
        );
        assert_eq!(wallet.balance(), 500.0);
    }

    #[test]
    fn test_submit_rejects_bad_customer_and_stays_editing() {
        let catalog = CarCatalog::seeded();
        let wallet = Wallet::default();
        let mut session = open_camry(&catalog);
        let err = session.submit(&wallet, 400.0).unwrap_err();
        assert!(matches!(
            err,
            BookingError::Invalid(ValidationError::InvalidField {
                field: CustomerField::Name,
                ..
            })
        ));
        assert_eq!(session.state(), SessionState::Editing);
        assert!(!session.is_awaiting_confirmation());
    }

    #[test]
    fn test_submit_rejects_over_limit() {
        let catalog = CarCatalog::seeded();
        let wallet = Wallet::default();
        let mut session = ready_session(&catalog);
        session.set_days(days(7)).unwrap();
        // 45 * 7 * 1.15 * 1.1 = 398.475, under 400
        assert!(session.submit(&wallet, 400.0).is_ok());
        let err = session.submit(&wallet, 300.0).unwrap_err();
        assert!(matches!(
            err,
            BookingError::Invalid(ValidationError::ExceedsRentalLimit { .. })
        ));
    }

    #[test]
    fn test_edit_after_submit_drops_approval() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();
        let mut session = ready_session(&catalog);
        session.submit(&wallet, 400.0).unwrap();
        assert!(session.is_awaiting_confirmation());
        session.set_days(days(2)).unwrap();
        assert!(!session.is_awaiting_confirmation());
        assert_eq!(
            session.confirm(&mut catalog, &mut wallet),
            Err(BookingError::NotSubmitted)
        );
    }

    #[test]
    fn test_confirm_rents_and_debits() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();
        let mut session = ready_session(&catalog);
        session.submit(&wallet, 400.0).unwrap();
        let receipt = session.confirm(&mut catalog, &mut wallet).unwrap();

        assert_eq!(session.state(), SessionState::Confirmed);
        assert_eq!(receipt.car, camry());
        assert!(approx_eq(receipt.quote.total, 170.775));
        assert!(approx_eq(wallet.balance(), 329.225));
        assert_eq!(wallet.display(), "329 credits");
        assert!(!names(&catalog).contains(&"Toyota Camry".to_string()));
    }

    #[test]
    fn test_terminal_sessions_reject_everything() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();
        let mut session = ready_session(&catalog);
        session.submit(&wallet, 400.0).unwrap();
        session.confirm(&mut catalog, &mut wallet).unwrap();

        let finished = Err(BookingError::Finished(SessionState::Confirmed));
        assert_eq!(session.set_insurance(false).map(|q| *q), finished.clone());
        assert_eq!(session.submit(&wallet, 400.0), finished.clone());
        assert_eq!(
            session.cancel(&mut catalog, &mut wallet),
            Err(BookingError::Finished(SessionState::Confirmed))
        );
    }

    #[test]
    fn test_cancel_fresh_session_changes_nothing() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();
        let mut session = ready_session(&catalog);
        session.submit(&wallet, 400.0).unwrap();
        assert_eq!(session.cancel(&mut catalog, &mut wallet), Ok(None));
        assert_eq!(session.state(), SessionState::Cancelled);
        assert_eq!(wallet.balance(), 500.0);
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_reopen_and_cancel_refunds_frozen_total() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();
        let mut session = ready_session(&catalog);
        session.submit(&wallet, 400.0).unwrap();
        let receipt = session.confirm(&mut catalog, &mut wallet).unwrap();

        let car = catalog.get(&receipt.car).unwrap().clone();
        let mut reopened = BookingSession::reopen(receipt.clone(), &car);
        assert_eq!(reopened.quote(), &receipt.quote);
        assert_eq!(
            reopened.set_days(days(1)),
            Err(BookingError::AlreadyBooked(receipt.reference))
        );

        let refund = reopened.cancel(&mut catalog, &mut wallet).unwrap();
        assert_eq!(refund, Some(receipt.quote.total));
        assert_eq!(wallet.balance(), 500.0);
        assert!(!catalog.get(&camry()).unwrap().is_rented());
        assert_eq!(names(&catalog)[0], "Toyota Camry");
    }

    #[test]
    fn test_cancel_stale_receipt_keeps_later_booking() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();

        let mut first = ready_session(&catalog);
        first.submit(&wallet, 400.0).unwrap();
        let old_receipt = first.confirm(&mut catalog, &mut wallet).unwrap();
        let car = catalog.get(&camry()).unwrap().clone();
        BookingSession::reopen(old_receipt.clone(), &car)
            .cancel(&mut catalog, &mut wallet)
            .unwrap();

        let mut second = ready_session(&catalog);
        second.submit(&wallet, 400.0).unwrap();
        second.confirm(&mut catalog, &mut wallet).unwrap();
        let balance = wallet.balance();

        let car = catalog.get(&camry()).unwrap().clone();
        let mut stale = BookingSession::reopen(old_receipt.clone(), &car);
        assert_eq!(
            stale.cancel(&mut catalog, &mut wallet),
            Err(BookingError::NotBooked(old_receipt.reference))
        );
        assert_eq!(stale.state(), SessionState::Editing);
        assert!(catalog.get(&camry()).unwrap().is_rented());
        assert!(!names(&catalog).contains(&"Toyota Camry".to_string()));
        assert_eq!(wallet.balance(), balance);
    }

    #[test]
    fn test_open_rented_car_fails() {
        let mut catalog = CarCatalog::seeded();
        catalog.mark_rented(&camry());
        let car = catalog.get(&camry()).unwrap();
        assert!(matches!(
            BookingSession::open(car),
            Err(BookingError::CarUnavailable(_))
        ));
    }

    #[test]
    fn test_confirm_fails_if_car_rented_meanwhile() {
        let mut catalog = CarCatalog::seeded();
        let mut wallet = Wallet::default();
        let mut first = ready_session(&catalog);
        let mut second = ready_session(&catalog);
        first.submit(&wallet, 400.0).unwrap();
        second.submit(&wallet, 400.0).unwrap();
        first.confirm(&mut catalog, &mut wallet).unwrap();

        let balance = wallet.balance();
        assert_eq!(
            second.confirm(&mut catalog, &mut wallet),
            Err(BookingError::CarUnavailable(camry()))
        );
        assert_eq!(wallet.balance(), balance);
        assert_eq!(second.state(), SessionState::Editing);
    }

    #[test]
    fn test_confirmation_summary() {
        let catalog = CarCatalog::seeded();
        let session = ready_session(&catalog);
        let text = session.confirmation_summary(500.0);
        assert!(text.starts_with("Booking Confirmation\n\nCar: Toyota Camry (2022)\n"));
        assert!(text.contains("Rental Duration: 3 day(s)\n"));
        assert!(text.contains("Daily Rate: 45 credits\n"));
        assert!(text.contains("Insurance: Yes\n"));
        assert!(text.contains("Total Cost: 171 credits\n"));
        assert!(text.contains("Remaining Balance: 329 credits\n"));
        assert!(text.ends_with("Confirm this booking?"));
    }
}
