use cost_basis_ledger::engine::EngineLedger;
use cost_basis_ledger::{Account, CostBasisEngine, FifoLotEngine, FifoStep, Lot, Tag};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn realize(
    engine: &FifoLotEngine,
    ledger: &mut EngineLedger<FifoLotEngine>,
    account: &str,
    price: f64,
    amount: f64,
    tag: i64,
) -> FifoStep {
    engine
        .realize(ledger, &Account::new(account), price, amount, Tag::new(tag))
        .expect("realize never fails for FIFO")
}

fn queue(ledger: &EngineLedger<FifoLotEngine>, account: &str) -> Vec<Lot> {
    ledger
        .position(&Account::new(account))
        .map(|q| q.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn test_exact_lot_consumption() {
    let engine = FifoLotEngine::default();
    let mut ledger = engine.new_ledger();
    realize(&engine, &mut ledger, "a", 10.0, 5.0, 1);
    realize(&engine, &mut ledger, "a", 12.0, 5.0, 2);

    let step = realize(&engine, &mut ledger, "a", 20.0, -7.0, 3);

    assert_eq!(step.realized_tags(), vec![Tag::new(1), Tag::new(2)]);
    assert_close(step.realized[0].amount, 5.0);
    assert_close(step.realized[0].capital_gain(), 50.0);
    assert_close(step.realized[1].amount, 2.0);
    assert_close(step.realized[1].capital_gain(), 16.0);
    assert_close(step.capital_gain(), 66.0);
    assert_eq!(step.last_price, Some(20.0));

    let remaining = queue(&ledger, "a");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].tag, Tag::new(2));
    assert_close(remaining[0].cost_basis, 12.0);
    assert_close(remaining[0].amount, 3.0);
}

#[test]
fn test_acquisitions_append_in_arrival_order() {
    let engine = FifoLotEngine::default();
    let mut ledger = engine.new_ledger();
    let first = realize(&engine, &mut ledger, "a", 10.0, 1.0, 1);
    realize(&engine, &mut ledger, "a", 11.0, 2.0, 2);
    realize(&engine, &mut ledger, "a", 12.0, 3.0, 3);

    assert!(first.realized.is_empty());
    assert_eq!(first.capital_gain(), 0.0);
    let tags: Vec<Tag> = queue(&ledger, "a").iter().map(|l| l.tag).collect();
    assert_eq!(tags, vec![Tag::new(1), Tag::new(2), Tag::new(3)]);
}

#[test]
fn test_crossing_zero_opens_short_lot() {
    let engine = FifoLotEngine::default();
    let mut ledger = engine.new_ledger();
    realize(&engine, &mut ledger, "a", 10.0, 2.0, 1);

    let step = realize(&engine, &mut ledger, "a", 15.0, -5.0, 2);
    assert_close(step.capital_gain(), 10.0);

    let remaining = queue(&ledger, "a");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].tag, Tag::new(2));
    assert_eq!(remaining[0].account, Account::new("a"));
    assert_close(remaining[0].cost_basis, 15.0);
    assert_close(remaining[0].amount, -3.0);
}

#[test]
fn test_short_lots_cover_in_order() {
    let engine = FifoLotEngine::default();
    let mut ledger = engine.new_ledger();
    realize(&engine, &mut ledger, "a", 30.0, -1.0, 1);
    realize(&engine, &mut ledger, "a", 20.0, -1.0, 2);

    let step = realize(&engine, &mut ledger, "a", 25.0, 1.5, 3);
    // first short covered for +5, half of the second for -2.5
    assert_close(step.capital_gain(), 2.5);
    assert_close(step.realized[0].amount, -1.0);
    assert_close(step.realized[1].amount, -0.5);

    let remaining = queue(&ledger, "a");
    assert_eq!(remaining.len(), 1);
    assert_close(remaining[0].amount, -0.5);
}

#[test]
fn test_queue_keeps_single_sign() {
    let engine = FifoLotEngine::default();
    let mut ledger = engine.new_ledger();
    let trades = [
        (10.0, 3.0),
        (11.0, 2.0),
        (12.0, -6.0),
        (9.0, -1.0),
        (8.0, 4.0),
        (10.0, 0.5),
    ];
    for (i, (price, amount)) in trades.iter().enumerate() {
        realize(&engine, &mut ledger, "a", *price, *amount, i as i64);
        let lots = queue(&ledger, "a");
        if let Some(first) = lots.first() {
            let negative = first.amount < 0.0;
            assert!(lots.iter().all(|l| (l.amount < 0.0) == negative));
        }
    }
    assert_close(engine.balance(ledger.position(&Account::new("a")).unwrap()), 2.5);
}

#[test]
fn test_full_close_empties_queue() {
    let engine = FifoLotEngine::default();
    let mut ledger = engine.new_ledger();
    realize(&engine, &mut ledger, "a", 10.0, 0.1, 1);
    realize(&engine, &mut ledger, "a", 10.0, 0.2, 2);

    let step = realize(&engine, &mut ledger, "a", 10.0, -0.3, 3);
    assert_eq!(step.realized.len(), 2);
    assert!(queue(&ledger, "a").is_empty());
}

#[test]
fn test_dust_trade_changes_nothing() {
    let engine = FifoLotEngine::default();
    let mut ledger = engine.new_ledger();
    realize(&engine, &mut ledger, "a", 10.0, 1.0, 1);

    let step = realize(&engine, &mut ledger, "a", 10.0, -1e-13, 2);
    assert!(step.realized.is_empty());
    assert_eq!(queue(&ledger, "a").len(), 1);
    assert_eq!(queue(&ledger, "a")[0].amount, 1.0);
}
