//! # Wallet
//!
//! The session's credit balance. Only a booking session moves money
//! (`debit` on confirm, `refund` on cancellation), and it validates first,
//! so the balance never goes negative through the public API.
//!
//! The balance is derived: opening amount minus the outstanding debits.
//! A refund drops its debit from the ledger instead of adding the amount
//! back, so confirm-then-cancel restores the balance bit for bit.

use log::{debug, warn};
use uuid::Uuid;

use crate::core::pricing::credits;

pub const DEFAULT_STARTING_BALANCE: f64 = 500.0;

/// Balance bands used to colour the balance display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceTier {
    /// 400 credits or more
    Healthy,
    /// 200 to 400
    Low,
    /// under 200
    Critical,
}

impl BalanceTier {
    pub fn label(self) -> &'static str {
        match self {
            BalanceTier::Healthy => "healthy",
            BalanceTier::Low => "low",
            BalanceTier::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    opening: f64,
    debits: Vec<(Uuid, f64)>,
}

impl Wallet {
    pub fn new(balance: f64) -> Self {
        Self {
            opening: balance,
            debits: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.debits
            .iter()
            .fold(self.opening, |balance, (_, amount)| balance - amount)
    }

    pub fn tier(&self) -> BalanceTier {
        let balance = self.balance();
        if balance >= 400.0 {
            BalanceTier::Healthy
        } else if balance >= 200.0 {
            BalanceTier::Low
        } else {
            BalanceTier::Critical
        }
    }

    /// "329 credits"
    pub fn display(&self) -> String {
        credits(self.balance())
    }

    pub(crate) fn debit(&mut self, reference: Uuid, amount: f64) {
        debug_assert!(
            amount <= self.balance(),
            "debit of {amount} exceeds balance {}",
            self.balance()
        );
        self.debits.push((reference, amount));
        debug!("Wallet debited {amount} for {reference}, balance now {}", self.balance());
    }

    /// Whether a debit under `reference` is still outstanding.
    pub(crate) fn holds(&self, reference: Uuid) -> bool {
        self.debits.iter().any(|(r, _)| *r == reference)
    }

    /// Reverses the debit recorded under `reference`. Returns the refunded
    /// amount, or `None` if nothing is outstanding for it.
    pub(crate) fn refund(&mut self, reference: Uuid) -> Option<f64> {
        let Some(pos) = self.debits.iter().position(|(r, _)| *r == reference) else {
            warn!("No outstanding debit for {reference}");
            return None;
        };
        let (_, amount) = self.debits.remove(pos);
        debug!("Wallet refunded {amount} for {reference}, balance now {}", self.balance());
        Some(amount)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}
