//! Two-phase transfer protocol shared by every engine.
//!
//! A withdrawal is *initiated* on the source account: the engine removes the
//! outgoing volume from the source position and describes it as a list of
//! cost-basis entries. The matching deposit *finalizes* the transfer by
//! replaying those entries on the destination through the engine's regular
//! realize step, so cost basis carries over without recognizing a gain.

use super::ledger::{Transfer, TransferKey};
use super::{CostBasisEngine, EngineLedger};
use crate::domain::{Account, Tag, TransferId};
use crate::error::LedgerError;

/// Outgoing leg of a transfer.
#[derive(Debug, Clone, Copy)]
pub struct Withdrawal<'a> {
    pub account: &'a Account,
    pub destination: &'a Account,
    pub transfer_id: Option<&'a TransferId>,
    /// Negative amount leaving `account`.
    pub amount: f64,
    /// Cost basis for any volume the source does not hold.
    pub price: Option<f64>,
    pub tag: Tag,
}

impl Withdrawal<'_> {
    /// Pending transfer carrying `entries` to the destination.
    pub(crate) fn into_pending<E>(self, entries: Vec<E>) -> Transfer<E> {
        Transfer {
            transfer_id: self.transfer_id.cloned(),
            from: self.account.clone(),
            to: self.destination.clone(),
            amount: -self.amount,
            entries,
            tag: self.tag,
        }
    }

    pub(crate) fn insufficient_balance(&self, missing: f64) -> LedgerError {
        LedgerError::InsufficientBalanceNoPrice {
            tag: self.tag,
            account: self.account.clone(),
            missing,
        }
    }
}

/// Incoming leg of a transfer.
#[derive(Debug, Clone, Copy)]
pub struct Deposit<'a> {
    pub account: &'a Account,
    pub source: &'a Account,
    pub transfer_id: Option<&'a TransferId>,
    /// Positive amount arriving on `account`.
    pub amount: f64,
    pub tag: Tag,
}

impl<'a> Deposit<'a> {
    fn key(&self) -> TransferKey<'a> {
        TransferKey {
            transfer_id: self.transfer_id,
            from: self.source,
            to: self.account,
            amount: self.amount,
        }
    }
}

/// Match `deposit` against the oldest pending transfer and replay its entries
/// onto the destination account.
///
/// # Errors
/// `NoMatchingTransfer` if nothing matches, `AmountMismatch` if an id-matched
/// transfer moved a different amount. The ledger is untouched on error.
pub fn finalize<E>(
    engine: &E,
    ledger: &mut EngineLedger<E>,
    deposit: &Deposit<'_>,
) -> Result<E::Step, LedgerError>
where
    E: CostBasisEngine + ?Sized,
{
    let tolerances = *engine.tolerances();

    let index = ledger
        .find_transfer(&deposit.key(), &tolerances)
        .ok_or_else(|| LedgerError::NoMatchingTransfer {
            tag: deposit.tag,
            from: deposit.source.clone(),
            to: deposit.account.clone(),
            amount: deposit.amount,
        })?;

    let pending = ledger.pending_transfers()[index].amount;
    if (pending - deposit.amount).abs() > tolerances.transfer_amount {
        return Err(LedgerError::AmountMismatch {
            tag: deposit.tag,
            from: deposit.source.clone(),
            to: deposit.account.clone(),
            pending,
            amount: deposit.amount,
        });
    }

    let transfer = ledger.take_transfer(index);
    let position = ledger.position_mut(deposit.account);
    let step = engine.replay(position, deposit.account, &transfer.entries);

    tracing::debug!(
        tag = %deposit.tag,
        from = %transfer.from,
        to = %transfer.to,
        initiated_at = %transfer.tag,
        entries = transfer.entries.len(),
        "transfer finalized"
    );

    Ok(step)
}
