//! Per-event output records.

use crate::domain::{Account, Decimal, Event, Tag};
use crate::engine::{AcbStep, FifoStep};
use serde::Serialize;

/// A step that can be rendered as one output record.
pub trait Report {
    type Record: Serialize;

    fn record(&self, event: &Event) -> Self::Record;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcbRecord {
    pub tag: Tag,
    pub account: Account,
    pub cost_basis_before: f64,
    pub cost_basis_after: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub capital_gain: f64,
}

impl Report for AcbStep {
    type Record = AcbRecord;

    fn record(&self, event: &Event) -> AcbRecord {
        AcbRecord {
            tag: event.tag,
            account: event.account.clone(),
            cost_basis_before: self.cost_basis_before,
            cost_basis_after: self.cost_basis_after,
            balance_before: self.balance_before,
            balance_after: self.balance_after,
            capital_gain: self.capital_gain,
        }
    }
}

/// One realized lot slice, keyed compactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealizedRecord {
    /// Tag of the lot's opening event.
    pub t: Tag,
    /// Amount closed.
    pub a: Decimal,
    /// Profit or loss.
    pub pl: Decimal,
    /// Cost basis.
    pub cb: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FifoRecord {
    pub tag: Tag,
    pub account: Account,
    pub capital_gain: f64,
    pub realized_tags: Vec<Tag>,
    pub realized: Vec<RealizedRecord>,
}

impl Report for FifoStep {
    type Record = FifoRecord;

    fn record(&self, event: &Event) -> FifoRecord {
        FifoRecord {
            tag: event.tag,
            account: event.account.clone(),
            capital_gain: self.capital_gain(),
            realized_tags: self.realized_tags(),
            realized: self
                .realized
                .iter()
                .map(|r| RealizedRecord {
                    t: r.tag,
                    a: Decimal::from_f64(r.amount),
                    pl: Decimal::from_f64(r.capital_gain()),
                    cb: Decimal::from_f64(r.cost_basis),
                })
                .collect(),
        }
    }
}
