//! Client-side filtering of clients by mark ranges.

use crate::models::{Client, Marks};

/// Upper bound of the engagement, purchase and churn scales.
pub const MARK_SCALE_MAX: f64 = 10.0;

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkRange {
    pub min: f64,
    pub max: f64,
}

impl MarkRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Mark ranges a client must fall within to be listed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarksFilter {
    pub like_to_engage: MarkRange,
    pub like_to_purchase: MarkRange,
    pub like_to_churn: MarkRange,
    pub ltv: MarkRange,
}

impl MarksFilter {
    /// Full-range filter for the given clients (nothing excluded).
    pub fn for_clients(clients: &[Client]) -> Self {
        let scale = MarkRange::new(0.0, MARK_SCALE_MAX);
        Self {
            like_to_engage: scale,
            like_to_purchase: scale,
            like_to_churn: scale,
            ltv: MarkRange::new(0.0, max_ltv(clients)),
        }
    }

    pub fn matches(&self, marks: &Marks) -> bool {
        self.like_to_engage.contains(marks.like_to_engage)
            && self.like_to_purchase.contains(marks.like_to_purchase)
            && self.like_to_churn.contains(marks.like_to_churn)
            && self.ltv.contains(marks.ltv)
    }

    /// Clients whose marks are all within range, in input order.
    pub fn apply<'a>(&self, clients: &'a [Client]) -> Vec<&'a Client> {
        clients.iter().filter(|c| self.matches(&c.marks)).collect()
    }
}

/// Largest LTV across clients, never below zero.
pub fn max_ltv(clients: &[Client]) -> f64 {
    clients
        .iter()
        .map(|c| c.marks.ltv)
        .fold(0.0_f64, f64::max)
}
