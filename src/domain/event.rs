//! Ledger event as delivered by the host, and its classification.

use crate::domain::{Account, Tag, TransferId};
use crate::error::LedgerError;
use serde::Serialize;

/// A single ordered event of a partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Sequence tag, strictly ordered within the partition.
    pub tag: Tag,
    /// Account the event applies to.
    pub account: Account,
    /// Destination (for withdrawals) or source (for deposits) of a transfer.
    /// `None` for trades.
    pub counterparty: Option<Account>,
    /// Trade price; optional for transfers.
    pub price: Option<f64>,
    /// Signed amount: positive acquires/deposits, negative disposes/withdraws.
    pub amount: f64,
    /// True for the first event of a partition.
    pub starts_partition: bool,
    pub transfer_id: Option<TransferId>,
    /// Transfer legs flagged by the host as irrelevant to cost basis.
    pub ignore_transfer: bool,
}

/// What an event asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind<'a> {
    /// Acquisition or disposal at `price`.
    Trade { price: f64 },
    /// Zero-amount trade without a price: carries the position forward.
    CarryForward,
    /// Outgoing leg of a transfer.
    Withdrawal {
        destination: &'a Account,
        price: Option<f64>,
    },
    /// Incoming leg of a transfer.
    Deposit { source: &'a Account },
    /// Transfer leg the host asked to skip.
    IgnoredTransfer,
}

impl Event {
    /// Build a trade event.
    pub fn trade(tag: i64, account: &str, price: f64, amount: f64) -> Self {
        Event {
            tag: Tag::new(tag),
            account: Account::new(account),
            counterparty: None,
            price: Some(price),
            amount,
            starts_partition: false,
            transfer_id: None,
            ignore_transfer: false,
        }
    }

    /// Build a transfer leg. Negative `amount` withdraws from `account` to
    /// `counterparty`, positive deposits into `account` from `counterparty`.
    pub fn transfer(tag: i64, account: &str, counterparty: &str, amount: f64) -> Self {
        Event {
            tag: Tag::new(tag),
            account: Account::new(account),
            counterparty: Some(Account::new(counterparty)),
            price: None,
            amount,
            starts_partition: false,
            transfer_id: None,
            ignore_transfer: false,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_transfer_id(mut self, id: &str) -> Self {
        self.transfer_id = Some(TransferId::new(id));
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore_transfer = true;
        self
    }

    /// Mark this event as the first of a new partition.
    pub fn starting_partition(mut self) -> Self {
        self.starts_partition = true;
        self
    }

    /// Classify the event.
    ///
    /// # Errors
    /// Returns `NullRequiredField` for a non-zero trade without a price.
    pub fn kind(&self) -> Result<EventKind<'_>, LedgerError> {
        let Some(counterparty) = self.counterparty.as_ref() else {
            return match self.price {
                Some(price) => Ok(EventKind::Trade { price }),
                None if self.amount == 0.0 => Ok(EventKind::CarryForward),
                None => Err(LedgerError::NullRequiredField {
                    tag: self.tag,
                    account: self.account.clone(),
                    field: "price",
                }),
            };
        };

        if self.ignore_transfer {
            Ok(EventKind::IgnoredTransfer)
        } else if self.amount < 0.0 {
            Ok(EventKind::Withdrawal {
                destination: counterparty,
                price: self.price,
            })
        } else {
            Ok(EventKind::Deposit {
                source: counterparty,
            })
        }
    }
}
