//! # Car Catalog
//!
//! Owns every `Car` (an arena indexed by position) and derives the view:
//! the available cars matching the search query, in sort order.
//!
//! ```text
//! cars: [Camry, CR-V, 3 Series, Model 3, Mustang]   // insertion order, owned
//!          │
//!          ▼  !is_rented && matches(query)
//! view:  [0, 3, 1]                                  // indices into cars
//!          ▲
//!       cursor
//! ```
//!
//! The view holds indices, never references, so it is always rebuilt from
//! the arena. Nothing outside this module gets `&mut Car`.

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::car::{Car, CarKey, seed_cars};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Insertion order
    #[default]
    None,
    /// Rating, high to low
    RatingDesc,
    /// Year, newest first
    YearDesc,
    /// Daily cost, low to high
    CostAsc,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "None",
            SortKey::RatingDesc => "Rating (High to Low)",
            SortKey::YearDesc => "Year (Newest to Oldest)",
            SortKey::CostAsc => "Cost (Low to High)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CarCatalog {
    cars: Vec<Car>,
    query: String,
    sort_key: SortKey,
    view: Vec<usize>,
    cursor: usize,
}

impl CarCatalog {
    /// Builds a catalog over `cars`. Panics on a duplicate `(name, model)`.
    pub fn new(cars: Vec<Car>) -> Self {
        let mut seen = HashSet::new();
        for car in &cars {
            assert!(seen.insert(car.key()), "duplicate catalog entry: {}", car.key());
        }
        let mut catalog = Self {
            cars,
            query: String::new(),
            sort_key: SortKey::None,
            view: Vec::new(),
            cursor: 0,
        };
        catalog.refresh();
        catalog
    }

    pub fn seeded() -> Self {
        Self::new(seed_cars())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Every car in insertion order, rented or not.
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn get(&self, key: &CarKey) -> Option<&Car> {
        self.cars.iter().find(|c| c.is_key(key))
    }

    /// Case-insensitive lookup by display name ("tesla model 3").
    pub fn find_by_display_name(&self, display_name: &str) -> Option<&Car> {
        let wanted = display_name.trim();
        self.cars
            .iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(wanted))
    }

    pub fn view(&self) -> Vec<&Car> {
        self.view.iter().map(|&i| &self.cars[i]).collect()
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Sets the filter. Leading/trailing whitespace is ignored.
    pub fn set_search_query(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.refresh();
        debug!("Search {:?} -> {} car(s)", self.query, self.view.len());
    }

    /// Re-sorts the view and puts the cursor back on the first car.
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
        self.refresh();
        self.cursor = 0;
        debug!("Sorted by {}", key.label());
    }

    pub fn move_next(&mut self) {
        if self.cursor + 1 < self.view.len() {
            self.cursor += 1;
        }
    }

    pub fn move_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor onto `key` if it is in the view.
    pub fn select(&mut self, key: &CarKey) -> bool {
        match self.view.iter().position(|&i| self.cars[i].is_key(key)) {
            Some(pos) => {
                self.cursor = pos;
                true
            }
            None => false,
        }
    }

    pub fn current_car(&self) -> Option<&Car> {
        self.view.get(self.cursor).map(|&i| &self.cars[i])
    }

    /// "Car 2 of 5", or `None` when the view is empty.
    pub fn counter_label(&self) -> Option<String> {
        if self.view.is_empty() {
            return None;
        }
        Some(format!("Car {} of {}", self.cursor + 1, self.view.len()))
    }

    pub(crate) fn position(&self, key: &CarKey) -> Option<usize> {
        self.cars.iter().position(|c| c.is_key(key))
    }

    pub(crate) fn car_at_mut(&mut self, index: usize) -> &mut Car {
        &mut self.cars[index]
    }

    /// Rebuilds the view from the arena and clamps the cursor.
    pub(crate) fn refresh(&mut self) {
        let query = self.query.as_str();
        let mut view: Vec<usize> = self
            .cars
            .iter()
            .enumerate()
            .filter(|(_, car)| !car.is_rented && car.matches(query))
            .map(|(i, _)| i)
            .collect();

        // sort_by is stable, so ties keep insertion order
        let cars = &self.cars;
        match self.sort_key {
            SortKey::None => {}
            SortKey::RatingDesc => {
                view.sort_by(|&a, &b| cars[b].rating.total_cmp(&cars[a].rating))
            }
            SortKey::YearDesc => view.sort_by(|&a, &b| cars[b].year.cmp(&cars[a].year)),
            SortKey::CostAsc => view.sort_by(|&a, &b| {
                cars[a]
                    .daily_rental_cost
                    .total_cmp(&cars[b].daily_rental_cost)
            }),
        }

        self.view = view;
        if self.cursor >= self.view.len() {
            self.cursor = self.view.len().saturating_sub(1);
        }
    }
}

impl Default for CarCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::names;

    #[test]
    fn test_seeded_view_is_insertion_order() {
        let catalog = CarCatalog::seeded();
        assert_eq!(
            names(&catalog),
            vec!["Toyota Camry", "Honda CR-V", "BMW 3 Series", "Tesla Model 3", "Ford Mustang"]
        );
        assert_eq!(catalog.cursor(), 0);
        assert_eq!(catalog.counter_label().as_deref(), Some("Car 1 of 5"));
    }

    #[test]
    fn test_search_toy_yields_camry() {
        let mut catalog = CarCatalog::seeded();
        catalog.set_search_query("toy");
        assert_eq!(names(&catalog), vec!["Toyota Camry"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_matches_model() {
        let mut catalog = CarCatalog::seeded();
        catalog.set_search_query("  MODEL ");
        assert_eq!(names(&catalog), vec!["Tesla Model 3"]);
        catalog.set_search_query("");
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_search_is_idempotent() {
        let mut once = CarCatalog::seeded();
        once.set_search_query("o");
        let mut twice = CarCatalog::seeded();
        twice.set_search_query("o");
        twice.set_search_query("o");
        assert_eq!(names(&once), names(&twice));
        assert_eq!(once.cursor(), twice.cursor());
    }

    #[test]
    fn test_search_no_match_is_empty() {
        let mut catalog = CarCatalog::seeded();
        catalog.set_search_query("lada");
        assert!(catalog.is_empty());
        assert!(catalog.current_car().is_none());
        assert!(catalog.counter_label().is_none());
        assert_eq!(catalog.cursor(), 0);
    }

    #[test]
    fn test_refilter_clamps_cursor_to_last() {
        let mut catalog = CarCatalog::seeded();
        for _ in 0..4 {
            catalog.move_next();
        }
        assert_eq!(catalog.cursor(), 4);
        // "o" matches Toyota, Honda, Model 3, Ford
        catalog.set_search_query("o");
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.cursor(), 3);
    }

    #[test]
    fn test_sort_keys() {
        let mut catalog = CarCatalog::seeded();
        catalog.set_sort_key(SortKey::RatingDesc);
        assert_eq!(
            names(&catalog),
            vec!["Tesla Model 3", "Honda CR-V", "Toyota Camry", "BMW 3 Series", "Ford Mustang"]
        );
        catalog.set_sort_key(SortKey::CostAsc);
        assert_eq!(
            names(&catalog),
            vec!["Toyota Camry", "Ford Mustang", "Honda CR-V", "Tesla Model 3", "BMW 3 Series"]
        );
        catalog.set_sort_key(SortKey::None);
        assert_eq!(names(&catalog)[0], "Toyota Camry");
    }

    #[test]
    fn test_year_sort_is_stable() {
        // CR-V and Model 3 are both 2023; CR-V was inserted first
        let mut catalog = CarCatalog::seeded();
        catalog.set_sort_key(SortKey::YearDesc);
        assert_eq!(
            names(&catalog),
            vec!["Honda CR-V", "Tesla Model 3", "Toyota Camry", "BMW 3 Series", "Ford Mustang"]
        );
    }

    #[test]
    fn test_rating_sort_is_stable_on_ties() {
        let mut catalog = CarCatalog::new(vec![
            Car::new("A", "One", 2020, 4.0, 1, 10.0, ""),
            Car::new("B", "Two", 2020, 4.5, 1, 10.0, ""),
            Car::new("C", "Three", 2020, 4.0, 1, 10.0, ""),
        ]);
        catalog.set_sort_key(SortKey::RatingDesc);
        assert_eq!(names(&catalog), vec!["B Two", "A One", "C Three"]);
    }

    #[test]
    fn test_sort_resets_cursor() {
        let mut catalog = CarCatalog::seeded();
        catalog.move_next();
        catalog.move_next();
        catalog.set_sort_key(SortKey::YearDesc);
        assert_eq!(catalog.cursor(), 0);
    }

    #[test]
    fn test_navigation_does_not_wrap() {
        let mut catalog = CarCatalog::seeded();
        catalog.move_previous();
        assert_eq!(catalog.cursor(), 0);
        for _ in 0..10 {
            catalog.move_next();
        }
        assert_eq!(catalog.cursor(), 4);
        assert_eq!(catalog.current_car().map(Car::display_name).as_deref(), Some("Ford Mustang"));
    }

    #[test]
    fn test_select_and_find() {
        let mut catalog = CarCatalog::seeded();
        let tesla = catalog.find_by_display_name("tesla model 3").unwrap().key();
        assert!(catalog.select(&tesla));
        assert_eq!(catalog.cursor(), 3);
        assert!(!catalog.select(&CarKey::new("Lada", "Niva")));
        assert_eq!(catalog.cursor(), 3);
    }

    #[test]
    #[should_panic(expected = "duplicate catalog entry")]
    fn test_duplicate_keys_rejected() {
        CarCatalog::new(vec![
            Car::new("A", "One", 2020, 4.0, 1, 10.0, ""),
            Car::new("A", "One", 2021, 3.0, 2, 12.0, ""),
        ]);
    }
}
