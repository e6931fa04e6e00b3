//! # Cars
//!
//! A `Car` is an immutable identity record plus two mutable flags
//! (`is_favorite`, `is_rented`). Cars are identified by their
//! `(name, model)` pair, wrapped up as a [`CarKey`]. There is no surrogate ID.
//!
//! The flags are `pub(crate)`: outside this crate they can only be read.
//! Inside it, only the tracker (see `tracker.rs`) writes them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup key for a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarKey {
    pub name: String,
    pub model: String,
}

impl CarKey {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for CarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Car {
    pub name: String,
    pub model: String,
    pub year: u16,
    /// 0.0 to 5.0 stars.
    pub rating: f32,
    pub kilometres: u32,
    pub daily_rental_cost: f64,
    pub image_ref: String,
    pub(crate) is_favorite: bool,
    pub(crate) is_rented: bool,
}

impl Car {
    pub fn new(
        name: &str,
        model: &str,
        year: u16,
        rating: f32,
        kilometres: u32,
        daily_rental_cost: f64,
        image_ref: &str,
    ) -> Self {
        debug_assert!((0.0..=5.0).contains(&rating), "rating out of range");
        debug_assert!(daily_rental_cost > 0.0, "daily cost must be positive");
        Self {
            name: name.to_string(),
            model: model.to_string(),
            year,
            rating,
            kilometres,
            daily_rental_cost,
            image_ref: image_ref.to_string(),
            is_favorite: false,
            is_rented: false,
        }
    }

    pub fn key(&self) -> CarKey {
        CarKey::new(&self.name, &self.model)
    }

    pub fn is_key(&self, key: &CarKey) -> bool {
        self.name == key.name && self.model == key.model
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn is_rented(&self) -> bool {
        self.is_rented
    }

    pub fn is_available(&self) -> bool {
        !self.is_rented
    }

    /// "Toyota Camry"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.model)
    }

    /// "45 credits/day" (whole credits, truncated)
    pub fn formatted_cost(&self) -> String {
        format!("{} credits/day", self.daily_rental_cost as i64)
    }

    /// "25,000 km"
    pub fn formatted_kilometres(&self) -> String {
        format!("{} km", group_thousands(self.kilometres))
    }

    /// Feature tags derived from rating, year and mileage.
    pub fn features(&self) -> Vec<String> {
        let mut features = Vec::new();
        if self.rating >= 4.5 {
            features.push("High Rating".to_string());
        }
        if self.year >= 2022 {
            features.push("New Model".to_string());
        }
        if self.kilometres < 20_000 {
            features.push("Low Mileage".to_string());
        }
        features.push(format!("{}k km", self.kilometres / 1000));
        features
    }

    /// Case-insensitive substring match on name or model.
    /// `needle` must already be lowercased; empty matches everything.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.model.to_lowercase().contains(needle)
    }
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// The fixed fleet every run starts from.
pub fn seed_cars() -> Vec<Car> {
    vec![
        Car::new("Toyota", "Camry", 2022, 4.5, 25_000, 45.0, "car_toyota"),
        Car::new("Honda", "CR-V", 2023, 4.7, 15_000, 65.0, "car_honda"),
        Car::new("BMW", "3 Series", 2021, 4.3, 35_000, 85.0, "car_bmw"),
        Car::new("Tesla", "Model 3", 2023, 4.8, 10_000, 75.0, "car_tesla"),
        Car::new("Ford", "Mustang", 2020, 4.2, 45_000, 55.0, "car_ford"),
    ]
}
