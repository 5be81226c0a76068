//! Partition lifecycle: boundary detection, end-of-partition validation, dispatch.

use super::transfer::{Deposit, Withdrawal};
use super::{CostBasisEngine, EngineLedger, Warning};
use crate::domain::{Event, EventKind};
use crate::error::LedgerError;

/// Drives one engine over an ordered event stream made of consecutive partitions.
///
/// The controller owns the ledger of the current partition. An event flagged as
/// starting a partition first validates and discards the previous ledger, then
/// runs against a fresh one.
pub struct PartitionController<E: CostBasisEngine> {
    engine: E,
    ledger: EngineLedger<E>,
    partitions: usize,
    events_in_partition: usize,
    warnings: Vec<Warning>,
}

impl<E: CostBasisEngine> PartitionController<E> {
    pub fn new(engine: E) -> Self {
        let ledger = engine.new_ledger();
        Self {
            engine,
            ledger,
            partitions: 0,
            events_in_partition: 0,
            warnings: Vec::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Ledger of the current partition.
    pub fn ledger(&self) -> &EngineLedger<E> {
        &self.ledger
    }

    /// Number of partitions that applied at least one event.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Process one event of the stream.
    ///
    /// A boundary closes the previous partition only if that partition applied
    /// at least one event, so retrying a rejected boundary event neither
    /// validates nor counts the boundary twice. A partition is counted once its
    /// first event is applied.
    ///
    /// # Errors
    /// Any engine error. The ledger is unchanged by the failed event; the caller
    /// decides whether to abort the partition.
    pub fn process(&mut self, event: &Event) -> Result<E::Step, LedgerError> {
        if event.starts_partition && self.events_in_partition > 0 {
            self.finish();
        }

        let step = self.dispatch(event)?;
        if self.events_in_partition == 0 {
            self.partitions += 1;
        }
        self.events_in_partition += 1;
        Ok(step)
    }

    /// Validate the current partition and replace its ledger with an empty one.
    ///
    /// Returns the partition's warnings; they are also kept for [`Self::take_warnings`].
    pub fn finish(&mut self) -> Vec<Warning> {
        let warnings = self.engine.validate_at_end(&self.ledger);
        for warning in &warnings {
            match warning {
                Warning::UnmatchedTransfer { tag, .. } => {
                    tracing::warn!(initiated_at = %tag, "{}", warning)
                }
                Warning::ResidualBalance { .. } => tracing::info!("{}", warning),
            }
        }

        if self.events_in_partition > 0 {
            tracing::debug!(
                partition = self.partitions,
                events = self.events_in_partition,
                warnings = warnings.len(),
                "partition closed"
            );
        }

        self.ledger = self.engine.new_ledger();
        self.events_in_partition = 0;
        self.warnings.extend(warnings.iter().cloned());
        warnings
    }

    /// Drain the warnings accumulated by partition boundaries so far.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn dispatch(&mut self, event: &Event) -> Result<E::Step, LedgerError> {
        let engine = &self.engine;
        let ledger = &mut self.ledger;

        match event.kind()? {
            EventKind::Trade { price } => {
                engine.realize(ledger, &event.account, price, event.amount, event.tag)
            }
            EventKind::CarryForward | EventKind::IgnoredTransfer => {
                Ok(engine.pass_through(ledger, &event.account))
            }
            EventKind::Withdrawal { destination, price } => engine.initiate_transfer(
                ledger,
                &Withdrawal {
                    account: &event.account,
                    destination,
                    transfer_id: event.transfer_id.as_ref(),
                    amount: event.amount,
                    price,
                    tag: event.tag,
                },
            ),
            EventKind::Deposit { source } => engine.finalize_transfer(
                ledger,
                &Deposit {
                    account: &event.account,
                    source,
                    transfer_id: event.transfer_id.as_ref(),
                    amount: event.amount,
                    tag: event.tag,
                },
            ),
        }
    }
}
