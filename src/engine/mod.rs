//! Pure cost-basis engines.
//!
//! Both methods share the [`CostBasisEngine`] interface and the transfer
//! protocol in [`transfer`]; they differ in how a position is represented and
//! how a trade is realized against it.

use crate::domain::{Account, Tag, Tolerances};
use crate::error::LedgerError;
use std::fmt;

pub mod acb;
pub mod fifo;
pub mod ledger;
pub mod partition;
pub mod transfer;

pub use acb::{AcbPosition, AcbStep, AverageCostEngine};
pub use fifo::{FifoLotEngine, FifoQueue, FifoStep, Lot, RealizedLot};
pub use ledger::{Ledger, Transfer, TransferKey, Warning};
pub use partition::PartitionController;
pub use transfer::{Deposit, Withdrawal};

/// Ledger type used by engine `E`.
pub type EngineLedger<E> =
    Ledger<<E as CostBasisEngine>::Position, <E as CostBasisEngine>::Entry>;

/// A cost-basis accounting method.
///
/// Every mutating call is atomic: it either applies completely or returns an
/// error with the ledger unchanged.
pub trait CostBasisEngine {
    /// Per-account position.
    type Position: Default + fmt::Debug;
    /// What a transfer carries from one account to another.
    type Entry: Clone + fmt::Debug;
    /// Per-event result.
    type Step: Clone + fmt::Debug;

    fn tolerances(&self) -> &Tolerances;

    fn new_ledger(&self) -> EngineLedger<Self> {
        Ledger::new()
    }

    /// Apply an acquisition (`amount > 0`) or disposal (`amount < 0`) at `price`.
    fn realize(
        &self,
        ledger: &mut EngineLedger<Self>,
        account: &Account,
        price: f64,
        amount: f64,
        tag: Tag,
    ) -> Result<Self::Step, LedgerError>;

    /// Remove the withdrawn volume from the source and record it as pending.
    fn initiate_transfer(
        &self,
        ledger: &mut EngineLedger<Self>,
        withdrawal: &Withdrawal<'_>,
    ) -> Result<Self::Step, LedgerError>;

    /// Complete the oldest matching pending transfer on the destination.
    fn finalize_transfer(
        &self,
        ledger: &mut EngineLedger<Self>,
        deposit: &Deposit<'_>,
    ) -> Result<Self::Step, LedgerError> {
        transfer::finalize(self, ledger, deposit)
    }

    /// Report the account's current state without changing it.
    fn pass_through(&self, ledger: &EngineLedger<Self>, account: &Account) -> Self::Step;

    /// Realize transferred entries on the destination position.
    fn replay(
        &self,
        position: &mut Self::Position,
        account: &Account,
        entries: &[Self::Entry],
    ) -> Self::Step;

    /// Net amount held by a position.
    fn balance(&self, position: &Self::Position) -> f64;

    /// Diagnostics for a partition that is about to be discarded.
    fn validate_at_end(&self, ledger: &EngineLedger<Self>) -> Vec<Warning> {
        ledger::end_of_partition_warnings(
            ledger.pending_transfers(),
            ledger
                .positions()
                .map(|(account, position)| (account.clone(), self.balance(position))),
            self.tolerances(),
        )
    }
}
