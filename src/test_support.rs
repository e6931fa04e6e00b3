//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::car::CarKey;
use crate::core::catalog::CarCatalog;
use crate::core::pricing::CustomerDetails;
use crate::core::state::App;

/// Creates a test App with the default balance and limit.
pub fn test_app() -> App {
    App::default()
}

pub fn camry() -> CarKey {
    CarKey::new("Toyota", "Camry")
}

/// Display names of the current view, in order.
pub fn names(catalog: &CarCatalog) -> Vec<String> {
    catalog.view().iter().map(|c| c.display_name()).collect()
}

/// A customer that passes every field check.
pub fn valid_customer() -> CustomerDetails {
    CustomerDetails {
        name: "Jane Doe".to_string(),
        email: "jane.doe@example.com".to_string(),
        phone: "0412345678".to_string(),
        license: "DL-123456".to_string(),
        age: 30,
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
