use crate::domain::Event;
use crate::engine::{CostBasisEngine, PartitionController, Warning};
use crate::error::LedgerError;
use crate::report::Report;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a complete replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub events: usize,
    pub partitions: usize,
    /// End-of-partition warnings, in partition order.
    pub warnings: Vec<Warning>,
}

/// Run every event through `engine`, writing one JSON record per event to `out`.
///
/// The last partition is validated once the stream is exhausted.
///
/// # Errors
/// Stops at the first fatal ledger error; records already written stay written.
pub fn replay_events<E, W>(
    engine: E,
    events: &[Event],
    out: &mut W,
) -> Result<ReplaySummary, ReplayError>
where
    E: CostBasisEngine,
    E::Step: Report,
    W: Write,
{
    let mut controller = PartitionController::new(engine);

    for event in events {
        let step = controller.process(event).inspect_err(|e| {
            tracing::error!(tag = %e.tag(), account = %event.account, error = %e, "event rejected");
        })?;
        serde_json::to_writer(&mut *out, &step.record(event))?;
        out.write_all(b"\n")?;
    }

    if !events.is_empty() {
        controller.finish();
    }
    out.flush()?;

    Ok(ReplaySummary {
        events: events.len(),
        partitions: controller.partitions(),
        warnings: controller.take_warnings(),
    })
}
