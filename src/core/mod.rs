//! # Core Application Logic
//!
//! This module contains Rent-a-car's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • App (state)          │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    CLI     │      │   Mobile   │      │    API     │
//!     │  Adapter   │      │  (future)  │      │  (future)  │
//!     │   (clap)   │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`car`]: `Car`, `CarKey` and the seed fleet
//! - [`catalog`]: search, sort and the selection cursor
//! - [`tracker`]: favorite / rented flags
//! - [`pricing`]: quotes and validation
//! - [`wallet`]: the credit balance
//! - [`booking`]: the booking session state machine
//! - [`state`]: the `App` struct, all application state in one place
//! - [`action`]: the `Action` enum and `update()`
//! - [`config`]: settings file, env vars and defaults

pub mod action;
pub mod booking;
pub mod car;
pub mod catalog;
pub mod config;
pub mod pricing;
pub mod state;
pub mod tracker;
pub mod wallet;

pub use action::{Action, Effect, update};
pub use state::App;
