//! First-in-first-out lot matching.
//!
//! Each account holds a queue of lots, oldest first. A trade in the opposite
//! direction of the queued lots consumes them from the front; whatever volume is
//! left opens a new lot at the back.

use super::transfer::Withdrawal;
use super::{CostBasisEngine, EngineLedger, Ledger};
use crate::domain::{same_sign, Account, Tag, Tolerances};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A discrete acquisition (or borrowed short) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Account that opened the lot.
    pub account: Account,
    /// Tag of the event that opened the lot.
    pub tag: Tag,
    pub cost_basis: f64,
    /// Signed remaining volume.
    pub amount: f64,
}

impl Lot {
    pub fn new(account: Account, tag: Tag, cost_basis: f64, amount: f64) -> Self {
        Self {
            account,
            tag,
            cost_basis,
            amount,
        }
    }
}

/// Lots of one account, oldest first.
pub type FifoQueue = VecDeque<Lot>;

/// Slice of a lot closed out by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedLot {
    pub account: Account,
    pub tag: Tag,
    pub cost_basis: f64,
    /// Volume closed, with the sign of the lot it came from.
    pub amount: f64,
    /// Price the slice was closed at.
    pub price: f64,
}

impl RealizedLot {
    fn from_lot(lot: &Lot, amount: f64, price: f64) -> Self {
        Self {
            account: lot.account.clone(),
            tag: lot.tag,
            cost_basis: lot.cost_basis,
            amount,
            price,
        }
    }

    pub fn capital_gain(&self) -> f64 {
        self.amount * (self.price - self.cost_basis)
    }
}

/// Result of one FIFO event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FifoStep {
    /// Lots closed by this event, in consumption order.
    pub realized: Vec<RealizedLot>,
    /// Price of the event; `None` for pass-through and price-less withdrawals.
    pub last_price: Option<f64>,
}

impl FifoStep {
    pub fn capital_gain(&self) -> f64 {
        self.realized.iter().map(RealizedLot::capital_gain).sum()
    }

    /// Tags of the lots closed by this event.
    pub fn realized_tags(&self) -> Vec<Tag> {
        self.realized.iter().map(|r| r.tag).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FifoLotEngine {
    tolerances: Tolerances,
}

impl FifoLotEngine {
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    /// Match `amount` against the front of `queue`, pushing closed slices to `realized`.
    fn consume(
        &self,
        queue: &mut FifoQueue,
        account: &Account,
        price: f64,
        amount: f64,
        tag: Tag,
        realized: &mut Vec<RealizedLot>,
    ) {
        let tol = &self.tolerances;
        if tol.is_dust(amount) {
            return;
        }

        let mut remaining = amount;
        while !tol.is_dust(remaining) {
            let Some(lot) = queue.front_mut() else {
                break;
            };
            if same_sign(lot.amount, remaining) {
                break;
            }

            if same_sign(lot.amount, lot.amount + remaining) {
                realized.push(RealizedLot::from_lot(lot, -remaining, price));
                lot.amount += remaining;
                remaining = 0.0;
                let drained = tol.is_dust(lot.amount);
                if drained {
                    queue.pop_front();
                }
            } else {
                realized.push(RealizedLot::from_lot(lot, lot.amount, price));
                remaining += lot.amount;
                queue.pop_front();
            }
        }

        if !tol.is_dust(remaining) {
            queue.push_back(Lot::new(account.clone(), tag, price, remaining));
        }
    }

    /// Volume of a withdrawal the queued lots cannot cover.
    fn uncovered(
        &self,
        queue: Option<&FifoQueue>,
        magnitude: f64,
        withdrawal: &Withdrawal<'_>,
    ) -> Result<f64, LedgerError> {
        let mut remaining = magnitude;
        for lot in queue.into_iter().flatten() {
            if remaining < self.tolerances.amount {
                break;
            }
            if lot.amount < self.tolerances.amount {
                return Err(LedgerError::NegativeLotInvariantViolation {
                    tag: withdrawal.tag,
                    account: withdrawal.account.clone(),
                });
            }
            remaining -= remaining.min(lot.amount);
        }
        Ok(remaining)
    }
}

impl CostBasisEngine for FifoLotEngine {
    type Position = FifoQueue;
    type Entry = Lot;
    type Step = FifoStep;

    fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    fn realize(
        &self,
        ledger: &mut EngineLedger<Self>,
        account: &Account,
        price: f64,
        amount: f64,
        tag: Tag,
    ) -> Result<FifoStep, LedgerError> {
        let queue = ledger.position_mut(account);
        let mut realized = Vec::new();
        self.consume(queue, account, price, amount, tag, &mut realized);
        Ok(FifoStep {
            realized,
            last_price: Some(price),
        })
    }

    fn initiate_transfer(
        &self,
        ledger: &mut EngineLedger<Self>,
        withdrawal: &Withdrawal<'_>,
    ) -> Result<FifoStep, LedgerError> {
        let magnitude = -withdrawal.amount;
        let residual = self.uncovered(ledger.position(withdrawal.account), magnitude, withdrawal)?;
        let borrow_at = if residual >= self.tolerances.transfer_amount {
            Some(
                withdrawal
                    .price
                    .ok_or_else(|| withdrawal.insufficient_balance(residual))?,
            )
        } else {
            None
        };

        let queue = ledger.position_mut(withdrawal.account);
        let mut entries = Vec::new();
        let mut remaining = magnitude;
        while remaining >= self.tolerances.amount {
            let Some(lot) = queue.front_mut() else {
                break;
            };
            if remaining > lot.amount {
                remaining -= lot.amount;
                entries.push(lot.clone());
                queue.pop_front();
            } else {
                entries.push(Lot {
                    amount: remaining,
                    ..lot.clone()
                });
                lot.amount -= remaining;
                remaining = 0.0;
                let drained = lot.amount < self.tolerances.amount;
                if drained {
                    queue.pop_front();
                }
            }
        }

        if let Some(price) = borrow_at {
            entries.push(Lot::new(
                withdrawal.account.clone(),
                withdrawal.tag,
                price,
                remaining,
            ));
            queue.push_back(Lot::new(
                withdrawal.account.clone(),
                withdrawal.tag,
                price,
                -remaining,
            ));
        }

        tracing::debug!(
            tag = %withdrawal.tag,
            from = %withdrawal.account,
            to = %withdrawal.destination,
            amount = magnitude,
            lots = entries.len(),
            "transfer initiated"
        );

        ledger.push_transfer(withdrawal.into_pending(entries));

        Ok(FifoStep {
            realized: Vec::new(),
            last_price: withdrawal.price,
        })
    }

    fn pass_through(&self, _ledger: &EngineLedger<Self>, _account: &Account) -> FifoStep {
        FifoStep::default()
    }

    fn replay(&self, queue: &mut FifoQueue, account: &Account, entries: &[Lot]) -> FifoStep {
        let mut realized = Vec::new();
        for entry in entries {
            self.consume(
                queue,
                account,
                entry.cost_basis,
                entry.amount,
                entry.tag,
                &mut realized,
            );
        }
        FifoStep {
            realized,
            last_price: entries.last().map(|e| e.cost_basis),
        }
    }

    fn balance(&self, queue: &FifoQueue) -> f64 {
        queue.iter().map(|lot| lot.amount).sum()
    }
}

impl Ledger<FifoQueue, Lot> {
    /// Number of open lots across all accounts.
    pub fn lot_count(&self) -> usize {
        self.positions().map(|(_, queue)| queue.len()).sum()
    }

    /// Net volume across all accounts.
    pub fn total_balance(&self) -> f64 {
        self.positions()
            .flat_map(|(_, queue)| queue.iter())
            .map(|lot| lot.amount)
            .sum()
    }
}
