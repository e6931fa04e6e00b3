//! # Favorite / Rental Tracker
//!
//! The only writers of `Car::is_favorite` and `Car::is_rented`. Every
//! mutator rebuilds the catalog view, so a rented car drops out of it
//! straight away.
//!
//! Keys always come from the catalog itself, so an unknown key is a caller
//! bug. `mark_rented` / `mark_available` panic on it; `toggle_favorite`
//! trips a debug assertion and is otherwise a logged no-op.

use log::{info, warn};

use crate::core::car::{Car, CarKey};
use crate::core::catalog::CarCatalog;

impl CarCatalog {
    /// Flips the favorite flag. Returns the new value, or `None` for an
    /// unknown key.
    pub fn toggle_favorite(&mut self, key: &CarKey) -> Option<bool> {
        let Some(index) = self.position(key) else {
            warn!("toggle_favorite: no car {}", key);
            debug_assert!(false, "toggle_favorite: unknown car {key}");
            return None;
        };
        let car = self.car_at_mut(index);
        car.is_favorite = !car.is_favorite;
        let now = car.is_favorite;
        info!("{} {} favorites", key, if now { "added to" } else { "removed from" });
        self.refresh();
        Some(now)
    }

    /// Marks the car rented. Panics if it is unknown or already rented.
    pub(crate) fn mark_rented(&mut self, key: &CarKey) {
        let index = self.expect_position(key, "mark_rented");
        let car = self.car_at_mut(index);
        assert!(!car.is_rented, "mark_rented: {key} is already rented");
        car.is_rented = true;
        info!("{} marked rented", key);
        self.refresh();
    }

    /// Marks the car available again. Returns whether it had been rented.
    pub(crate) fn mark_available(&mut self, key: &CarKey) -> bool {
        let index = self.expect_position(key, "mark_available");
        let car = self.car_at_mut(index);
        let was_rented = car.is_rented;
        car.is_rented = false;
        info!("{} marked available (was rented: {})", key, was_rented);
        self.refresh();
        was_rented
    }

    /// All favorites in insertion order, rented ones included.
    pub fn favorites(&self) -> Vec<&Car> {
        self.cars().iter().filter(|c| c.is_favorite()).collect()
    }

    /// One "• Toyota Camry (2022)" line per favorite; `None` when there are none.
    pub fn favorites_listing(&self) -> Option<String> {
        let favorites = self.favorites();
        if favorites.is_empty() {
            return None;
        }
        Some(
            favorites
                .iter()
                .map(|c| format!("• {} {} ({})", c.name, c.model, c.year))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    fn expect_position(&self, key: &CarKey, op: &str) -> usize {
        match self.position(key) {
            Some(index) => index,
            None => panic!("{op}: unknown car {key}"),
        }
    }
}
