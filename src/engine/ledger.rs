//! Per-partition ledger: account positions plus in-flight transfers.

use crate::domain::{Account, Tag, Tolerances, TransferId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A withdrawal that was initiated on its source account but not yet finalized
/// on its destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer<E> {
    pub transfer_id: Option<TransferId>,
    pub from: Account,
    pub to: Account,
    /// Withdrawn magnitude, as the destination will see it.
    pub amount: f64,
    /// Cost-basis entries leaving the source account, replayed on the destination.
    pub entries: Vec<E>,
    /// Tag of the initiating event.
    pub tag: Tag,
}

/// What a finalize event knows about the transfer it completes.
#[derive(Debug, Clone, Copy)]
pub struct TransferKey<'a> {
    pub transfer_id: Option<&'a TransferId>,
    pub from: &'a Account,
    pub to: &'a Account,
    pub amount: f64,
}

impl<E> Transfer<E> {
    /// Returns true if `key` identifies this transfer.
    ///
    /// Ids win when both legs carry one. A leg with an id never matches a leg
    /// without one. Otherwise accounts must agree and amounts must be within the
    /// transfer tolerance.
    pub fn matches(&self, key: &TransferKey<'_>, tolerances: &Tolerances) -> bool {
        match (self.transfer_id.as_ref(), key.transfer_id) {
            (Some(own), Some(other)) => own == other,
            (None, None) => {
                &self.from == key.from
                    && &self.to == key.to
                    && tolerances.transfer_amounts_match(self.amount, key.amount)
            }
            _ => false,
        }
    }
}

/// Non-fatal findings reported when a partition ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Withdrawal without matching deposit.
    UnmatchedTransfer {
        from: Account,
        to: Account,
        amount: f64,
        tag: Tag,
    },
    /// Account still holds a position at partition end.
    ResidualBalance { account: Account, amount: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnmatchedTransfer {
                from, to, amount, ..
            } => write!(
                f,
                "unfinished transfer detected {} -> {}: {}, withdrawal without deposit",
                from, to, amount
            ),
            Warning::ResidualBalance { account, amount } => write!(
                f,
                "remaining amount detected {} {}, not all amount was realized at end",
                account, amount
            ),
        }
    }
}

/// Mutable state shared by every event of one partition.
///
/// `P` is the per-account position (scalar ACB entry or FIFO lot queue) and `E`
/// the entry type transfers carry between accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger<P, E> {
    /// Ordered by account for deterministic diagnostics.
    accounts: BTreeMap<Account, P>,
    transfers: Vec<Transfer<E>>,
}

impl<P, E> Ledger<P, E> {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            transfers: Vec::new(),
        }
    }

    pub fn position(&self, account: &Account) -> Option<&P> {
        self.accounts.get(account)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&Account, &P)> {
        self.accounts.iter()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Pending transfers in initiation order.
    pub fn pending_transfers(&self) -> &[Transfer<E>] {
        &self.transfers
    }

    pub(crate) fn push_transfer(&mut self, transfer: Transfer<E>) {
        self.transfers.push(transfer);
    }

    /// Index of the oldest pending transfer matching `key`.
    pub(crate) fn find_transfer(&self, key: &TransferKey<'_>, tolerances: &Tolerances) -> Option<usize> {
        self.transfers.iter().position(|t| t.matches(key, tolerances))
    }

    pub(crate) fn take_transfer(&mut self, index: usize) -> Transfer<E> {
        self.transfers.remove(index)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty() && self.transfers.is_empty()
    }
}

impl<P: Default, E> Ledger<P, E> {
    /// Position of `account`, created with its default value if absent.
    pub fn position_mut(&mut self, account: &Account) -> &mut P {
        self.accounts.entry(account.clone()).or_default()
    }
}

impl<P, E> Default for Ledger<P, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Warnings for transfers still pending and balances that were not closed out.
///
/// `balances` yields the net amount held per account.
pub fn end_of_partition_warnings<E>(
    transfers: &[Transfer<E>],
    balances: impl IntoIterator<Item = (Account, f64)>,
    tolerances: &Tolerances,
) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = transfers
        .iter()
        .map(|t| Warning::UnmatchedTransfer {
            from: t.from.clone(),
            to: t.to.clone(),
            amount: t.amount,
            tag: t.tag,
        })
        .collect();

    warnings.extend(
        balances
            .into_iter()
            .filter(|(_, amount)| !tolerances.is_dust(*amount))
            .map(|(account, amount)| Warning::ResidualBalance { account, amount }),
    );

    warnings
}
