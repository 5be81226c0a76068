//! Float tolerances used by every engine.
//!
//! Amounts are plain `f64`. Anything below [`AMOUNT_EPSILON`] in magnitude is treated
//! as zero, and the two legs of a transfer must agree within [`TRANSFER_AMOUNT_EPSILON`].

use serde::{Deserialize, Serialize};

/// Amounts below this magnitude are dust and treated as zero.
pub const AMOUNT_EPSILON: f64 = 1e-12;

/// Incoming and outgoing transfer amounts must agree within this absolute precision.
pub const TRANSFER_AMOUNT_EPSILON: f64 = 1e-8;

/// Tolerances an engine is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub amount: f64,
    pub transfer_amount: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            amount: AMOUNT_EPSILON,
            transfer_amount: TRANSFER_AMOUNT_EPSILON,
        }
    }
}

impl Tolerances {
    /// Returns true if `value` is indistinguishable from zero.
    pub fn is_dust(&self, value: f64) -> bool {
        value.abs() < self.amount
    }

    /// Snap dust to an exact (positive) zero.
    pub fn snap(&self, value: f64) -> f64 {
        if self.is_dust(value) {
            0.0
        } else {
            value
        }
    }

    /// Returns true if two transfer amounts are close enough to belong to the same transfer.
    pub fn transfer_amounts_match(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.transfer_amount
    }
}

/// Sign comparison on the IEEE sign bit: `0.0` counts as non-negative.
pub fn same_sign(a: f64, b: f64) -> bool {
    a.is_sign_negative() == b.is_sign_negative()
}
