//! CSV event source.
//!
//! Expected header:
//! `partition,tag,account,counterparty,price,amount,transfer_id,ignore_transfer`.
//! Empty fields are absent values. Rows must already be in processing order; a
//! row starts a new partition when its `partition` value differs from the
//! previous row's.

use crate::domain::{Account, Event, Tag, TransferId};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(String),
    #[error("line {line}: {field} can't be null")]
    MissingField { line: u64, field: &'static str },
}

#[derive(Debug, serde::Deserialize)]
struct Row {
    #[serde(default)]
    partition: Option<String>,
    tag: Option<i64>,
    account: Option<String>,
    #[serde(default)]
    counterparty: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    amount: Option<f64>,
    #[serde(default)]
    transfer_id: Option<String>,
    #[serde(default)]
    ignore_transfer: Option<bool>,
}

/// Parse events from CSV bytes in stream order.
pub fn parse_events<R: Read>(reader: R) -> Result<Vec<Event>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut events = Vec::new();
    let mut previous_partition: Option<Option<String>> = None;

    for record in reader.deserialize::<Row>() {
        let row = record.map_err(|e| SourceError::Csv(e.to_string()))?;
        let line = events.len() as u64 + 2;
        let missing = |field| SourceError::MissingField { line, field };

        let tag = row.tag.ok_or_else(|| missing("tag"))?;
        let account = row
            .account
            .filter(|a| !a.is_empty())
            .ok_or_else(|| missing("account"))?;
        let amount = row.amount.ok_or_else(|| missing("amount"))?;

        let partition = row.partition.filter(|p| !p.is_empty());
        let starts_partition = previous_partition.as_ref() != Some(&partition);
        previous_partition = Some(partition);

        events.push(Event {
            tag: Tag::new(tag),
            account: Account::new(account),
            counterparty: row.counterparty.filter(|c| !c.is_empty()).map(Account::new),
            price: row.price,
            amount,
            starts_partition,
            transfer_id: row.transfer_id.filter(|t| !t.is_empty()).map(TransferId::new),
            ignore_transfer: row.ignore_transfer.unwrap_or(false),
        });
    }

    Ok(events)
}

/// Read and parse the event file at `path`.
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<Event>, SourceError> {
    let file = File::open(path)?;
    parse_events(file)
}
