//! # Application State
//!
//! Everything one run of the app owns, in one place. There is no global
//! state: presentation code builds an `App` once and routes every change
//! through `update(app, action)` in action.rs.
//!
//! ```text
//! App
//! ├── catalog: CarCatalog            // cars, search, sort, cursor
//! ├── wallet: Wallet                 // credit balance
//! ├── max_rental_cost: f64           // per-booking limit
//! ├── booking: Option<BookingSession>// the booking screen, when open
//! ├── receipts: Vec<Receipt>         // confirmed bookings, refundable
//! ├── status_message: String         // last notice for the user
//! └── error: Option<String>          // last rejected action
//! ```

use uuid::Uuid;

use crate::core::booking::{BookingSession, Receipt};
use crate::core::catalog::CarCatalog;
use crate::core::config::{DEFAULT_MAX_RENTAL_COST, ResolvedConfig};
use crate::core::pricing;
use crate::core::wallet::{DEFAULT_STARTING_BALANCE, Wallet};

#[derive(Debug)]
pub struct App {
    pub catalog: CarCatalog,
    pub wallet: Wallet,
    pub max_rental_cost: f64,
    pub booking: Option<BookingSession>,
    pub receipts: Vec<Receipt>,
    pub status_message: String,
    pub error: Option<String>,
}

impl App {
    pub fn new(starting_balance: f64, max_rental_cost: f64) -> Self {
        Self {
            catalog: CarCatalog::seeded(),
            wallet: Wallet::new(starting_balance),
            max_rental_cost,
            booking: None,
            receipts: Vec::new(),
            status_message: String::from("Welcome to Rent-a-car!"),
            error: None,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut app = Self::new(config.starting_balance, config.max_rental_cost);
        app.catalog.set_sort_key(config.default_sort);
        app
    }

    pub fn receipt(&self, reference: Uuid) -> Option<&Receipt> {
        self.receipts.iter().find(|r| r.reference == reference)
    }

    /// Price summary for the open booking, with limit/balance warnings.
    pub fn price_breakdown(&self) -> Option<String> {
        let session = self.booking.as_ref()?;
        Some(pricing::price_breakdown(
            session.quote(),
            session.days(),
            session.insurance(),
            self.wallet.balance(),
            self.max_rental_cost,
        ))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE, DEFAULT_MAX_RENTAL_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::SortKey;
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, "Welcome to Rent-a-car!");
        assert_eq!(app.wallet.balance(), 500.0);
        assert_eq!(app.max_rental_cost, 400.0);
        assert_eq!(app.catalog.len(), 5);
        assert!(app.booking.is_none());
        assert!(app.price_breakdown().is_none());
    }

    #[test]
    fn test_from_config_applies_sort() {
        let config = ResolvedConfig {
            default_sort: SortKey::CostAsc,
            starting_balance: 120.0,
            ..Default::default()
        };
        let app = App::from_config(&config);
        assert_eq!(app.catalog.sort_key(), SortKey::CostAsc);
        assert_eq!(app.wallet.balance(), 120.0);
        assert_eq!(
            app.catalog.current_car().map(|c| c.display_name()).as_deref(),
            Some("Toyota Camry")
        );
    }
}
