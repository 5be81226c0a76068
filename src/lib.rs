pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod report;
pub mod source;

pub use config::{Config, CostBasisMethod};
pub use domain::{Account, Decimal, Event, EventKind, Tag, Tolerances, TransferId};
pub use engine::{
    AcbPosition, AcbStep, AverageCostEngine, CostBasisEngine, FifoLotEngine, FifoQueue, FifoStep,
    Ledger, Lot, PartitionController, RealizedLot, Warning,
};
pub use error::LedgerError;
pub use orchestration::{replay_events, ReplayError, ReplaySummary};
