use cost_basis_ledger::{
    config::Config, replay_events, source::read_events, AverageCostEngine, CostBasisMethod,
    FifoLotEngine,
};
use std::io::Write;

fn main() {
    // Initialize tracing; stdout carries the records, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let events = match read_events(&config.events_path) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Failed to read events from {}: {}", config.events_path, e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        path = %config.events_path,
        events = events.len(),
        method = ?config.method,
        "replaying events"
    );

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    let result = match config.method {
        CostBasisMethod::Acb => {
            replay_events(AverageCostEngine::new(config.tolerances), &events, &mut out)
        }
        CostBasisMethod::Fifo => {
            replay_events(FifoLotEngine::new(config.tolerances), &events, &mut out)
        }
    };

    match result {
        Ok(summary) => tracing::info!(
            events = summary.events,
            partitions = summary.partitions,
            warnings = summary.warnings.len(),
            "replay complete"
        ),
        Err(e) => {
            let _ = out.flush();
            eprintln!("Replay failed: {}", e);
            std::process::exit(1);
        }
    }
}
