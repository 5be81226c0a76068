//! Domain types shared by the engines and the host driver.
//!
//! This module provides:
//! - Identifiers: Account, Tag, TransferId
//! - Float tolerances and sign helpers
//! - The Event type and its classification
//! - Fixed-point Decimal for reports

pub mod decimal;
pub mod event;
pub mod primitives;
pub mod tolerance;

pub use decimal::Decimal;
pub use event::{Event, EventKind};
pub use primitives::{Account, Tag, TransferId};
pub use tolerance::{same_sign, Tolerances, AMOUNT_EPSILON, TRANSFER_AMOUNT_EPSILON};
