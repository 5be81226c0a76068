//! Average cost basis: every unit of an account shares one weighted-average cost.

use super::transfer::Withdrawal;
use super::{CostBasisEngine, EngineLedger};
use crate::domain::{same_sign, Account, Tag, Tolerances};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};

/// Scalar position of one account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcbPosition {
    /// Only meaningful while `amount != 0`; carried forward through flat periods.
    pub cost_basis: f64,
    /// Signed balance: positive = long, negative = short.
    pub amount: f64,
}

impl AcbPosition {
    pub fn new(cost_basis: f64, amount: f64) -> Self {
        Self { cost_basis, amount }
    }
}

impl Default for AcbPosition {
    fn default() -> Self {
        Self {
            cost_basis: 1.0,
            amount: 0.0,
        }
    }
}

/// Result of one ACB event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcbStep {
    pub cost_basis_before: f64,
    pub cost_basis_after: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub capital_gain: f64,
}

impl AcbStep {
    /// Step that leaves `position` as it is.
    pub fn unchanged(position: AcbPosition) -> Self {
        Self {
            cost_basis_before: position.cost_basis,
            cost_basis_after: position.cost_basis,
            balance_before: position.amount,
            balance_after: position.amount,
            capital_gain: 0.0,
        }
    }

    /// Fold a later step on the same account into this one.
    fn then(self, next: AcbStep) -> Self {
        Self {
            cost_basis_before: self.cost_basis_before,
            cost_basis_after: next.cost_basis_after,
            balance_before: self.balance_before,
            balance_after: next.balance_after,
            capital_gain: self.capital_gain + next.capital_gain,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AverageCostEngine {
    tolerances: Tolerances,
}

impl AverageCostEngine {
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }

    /// Apply one trade to `position`.
    fn apply(&self, position: &mut AcbPosition, price: f64, amount: f64) -> AcbStep {
        let before = *position;
        let balance_after = self.tolerances.snap(before.amount + amount);

        let (cost_basis_after, capital_gain) = if same_sign(before.amount, amount) {
            // open or increase
            let cost_basis = if balance_after == 0.0 {
                before.cost_basis
            } else {
                (before.cost_basis * before.amount + price * amount) / balance_after
            };
            (cost_basis, 0.0)
        } else if same_sign(before.amount, balance_after) {
            // reduce without crossing zero
            (before.cost_basis, amount * (before.cost_basis - price))
        } else {
            // close and flip: the new position opens at price
            (price, before.amount * (price - before.cost_basis))
        };

        *position = AcbPosition::new(cost_basis_after, balance_after);

        AcbStep {
            cost_basis_before: before.cost_basis,
            cost_basis_after,
            balance_before: before.amount,
            balance_after,
            capital_gain,
        }
    }
}

impl CostBasisEngine for AverageCostEngine {
    type Position = AcbPosition;
    type Entry = AcbPosition;
    type Step = AcbStep;

    fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    fn realize(
        &self,
        ledger: &mut EngineLedger<Self>,
        account: &Account,
        price: f64,
        amount: f64,
        _tag: Tag,
    ) -> Result<AcbStep, LedgerError> {
        let position = ledger.position_mut(account);
        Ok(self.apply(position, price, amount))
    }

    fn initiate_transfer(
        &self,
        ledger: &mut EngineLedger<Self>,
        withdrawal: &Withdrawal<'_>,
    ) -> Result<AcbStep, LedgerError> {
        let before = ledger
            .position(withdrawal.account)
            .copied()
            .unwrap_or_default();
        let amount = withdrawal.amount;
        let balance_after = self.tolerances.snap(before.amount + amount);

        let (cost_basis_after, entries) = if before.amount < 0.0 {
            // Already short: the withdrawal borrows more at `price`.
            let price = withdrawal
                .price
                .ok_or_else(|| withdrawal.insufficient_balance(-amount))?;
            let cost_basis = if balance_after == 0.0 {
                before.cost_basis
            } else {
                (before.cost_basis * before.amount + price * amount) / balance_after
            };
            (cost_basis, vec![AcbPosition::new(price, -amount)])
        } else if balance_after < 0.0 {
            // Overdrawn: everything held leaves at its basis, the rest is borrowed at `price`.
            let price = withdrawal
                .price
                .ok_or_else(|| withdrawal.insufficient_balance(-balance_after))?;
            let mut entries = Vec::with_capacity(2);
            if !self.tolerances.is_dust(before.amount) {
                entries.push(AcbPosition::new(before.cost_basis, before.amount));
            }
            entries.push(AcbPosition::new(price, -balance_after));
            (price, entries)
        } else {
            (
                before.cost_basis,
                vec![AcbPosition::new(before.cost_basis, -amount)],
            )
        };

        *ledger.position_mut(withdrawal.account) = AcbPosition::new(cost_basis_after, balance_after);
        ledger.push_transfer(withdrawal.into_pending(entries));

        tracing::debug!(
            tag = %withdrawal.tag,
            from = %withdrawal.account,
            to = %withdrawal.destination,
            amount = -amount,
            "transfer initiated"
        );

        Ok(AcbStep {
            cost_basis_before: before.cost_basis,
            cost_basis_after,
            balance_before: before.amount,
            balance_after,
            capital_gain: 0.0,
        })
    }

    fn pass_through(&self, ledger: &EngineLedger<Self>, account: &Account) -> AcbStep {
        AcbStep::unchanged(ledger.position(account).copied().unwrap_or_default())
    }

    /// Combined step over all entries: state before the first entry, state
    /// after the last one, gains summed.
    fn replay(
        &self,
        position: &mut AcbPosition,
        _account: &Account,
        entries: &[AcbPosition],
    ) -> AcbStep {
        entries
            .iter()
            .fold(AcbStep::unchanged(*position), |step, entry| {
                let next = self.apply(position, entry.cost_basis, entry.amount);
                step.then(next)
            })
    }

    fn balance(&self, position: &AcbPosition) -> f64 {
        position.amount
    }
}
