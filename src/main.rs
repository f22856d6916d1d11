//! BETCODE — bet-code parsing CLI.
//!
//! Diagnostic harness around the library: loads a catalog, initialises
//! structured logging, reads bet-code text from a file argument or stdin,
//! parses it for today's draw, and prints the draft as JSON.
//!
//! Usage: `betcode [catalog.toml] [bets.txt]` (text from stdin when no
//! second argument is given).

use anyhow::{Context, Result};
use std::io::Read;
use tracing::{info, warn};

use betcode::config::Catalog;
use betcode::parser::{self, ParseContext};

fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let catalog_path = args.next().unwrap_or_else(|| "catalog.toml".to_string());
    let bets_path = args.next();

    let catalog = Catalog::load(&catalog_path)?;
    info!(
        catalog = %catalog_path,
        stations = catalog.stations.len(),
        bet_types = catalog.bet_types.len(),
        combinations = catalog.combinations.len(),
        "Catalog loaded"
    );

    let raw = match bets_path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read bet text from {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read bet text from stdin")?;
            buf
        }
    };

    let ctx = ParseContext {
        stations: &catalog.stations,
        bet_types: &catalog.bet_types,
        combinations: &catalog.combinations,
        commission: catalog.commission,
        draw_date: chrono::Local::now().date_naive(),
    };

    let draft = parser::parse(&raw, &ctx)?;

    if draft.error_line_count() > 0 {
        warn!(
            errors = draft.error_line_count(),
            total = draft.lines.len(),
            "Some lines could not be resolved"
        );
    }
    info!(
        draw_date = %draft.draw_date,
        lines = draft.lines.len(),
        total_stake = %draft.total_stake,
        total_prize = %draft.total_potential_prize,
        "Parse complete"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&draft).context("Failed to serialise draft")?
    );
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("betcode=info"));

    if std::env::var("BETCODE_LOG_JSON").is_ok() {
        fmt().json().with_env_filter(env_filter).with_target(true).init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
