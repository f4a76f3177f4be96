//! # Harbor Back Office CLI
//!
//! ```text
//! backoffice [--config PATH] settle <SALE_RETURN_ID>...
//! backoffice [--config PATH] balance <CUSTOMER_ID>
//! ```
//!
//! `settle` publishes one `SaleReturned` event per id to a settlement
//! worker, waits for it to drain, and prints the counts.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use backoffice::{Backoffice, BackofficeConfig, BackofficeError, BackofficeResult, DomainEvent};
use harbor_core::validation::validate_id;

#[derive(Debug)]
enum Command {
    Settle(Vec<String>),
    Balance(String),
}

fn print_usage() {
    println!("Harbor back office");
    println!();
    println!("Usage:");
    println!("  backoffice [--config PATH] settle <SALE_RETURN_ID>...");
    println!("  backoffice [--config PATH] balance <CUSTOMER_ID>");
    println!();
    println!("Options:");
    println!("  -c, --config PATH  Config file (default: $HARBOR_CONFIG or platform config dir)");
    println!("  -h, --help         Show this help message");
}

/// `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<(Option<PathBuf>, Command)>, String> {
    let mut config_path = None;
    let mut rest = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args.get(i + 1).ok_or("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            other => rest.push(other.to_string()),
        }
        i += 1;
    }

    let mut rest = rest.into_iter();
    let command = match rest.next().as_deref() {
        Some("settle") => {
            let ids: Vec<String> = rest.collect();
            if ids.is_empty() {
                return Err("settle needs at least one sale return id".into());
            }
            for id in &ids {
                validate_id("sale_return_id", id).map_err(|e| e.to_string())?;
            }
            Command::Settle(ids)
        }
        Some("balance") => {
            let customer_id = rest.next().ok_or("balance needs a customer id")?;
            validate_id("customer_id", &customer_id).map_err(|e| e.to_string())?;
            Command::Balance(customer_id)
        }
        Some(other) => return Err(format!("unknown command '{other}'")),
        None => return Err("no command given".into()),
    };

    Ok(Some((config_path, command)))
}

#[tokio::main]
async fn main() -> ExitCode {
    backoffice::init_tracing();

    let args: Vec<String> = env::args().collect();
    let (config_path, command) = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run(config_path, command).await {
        Ok(code) => code,
        Err(e) => {
            error!(?e, "Back office command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: Option<PathBuf>, command: Command) -> BackofficeResult<ExitCode> {
    let config = BackofficeConfig::load(config_path)?;
    let app = Backoffice::open(config).await?;

    let result = match command {
        Command::Settle(ids) => settle(&app, ids).await,
        Command::Balance(customer_id) => print_balance(&app, &customer_id)
            .await
            .map(|()| ExitCode::SUCCESS),
    };

    app.close_with(result).await
}

async fn settle(app: &Backoffice, ids: Vec<String>) -> BackofficeResult<ExitCode> {
    let (worker, handle) = app.settlement_worker();
    let task = tokio::spawn(worker.run());

    info!(count = ids.len(), "Publishing sale return events");
    for id in ids {
        handle.publish(DomainEvent::sale_returned(id)).await?;
    }
    handle.shutdown().await?;

    let stats = task
        .await
        .map_err(|e| BackofficeError::Channel(format!("Settlement worker panicked: {e}")))?;

    println!("handled: {}, failed: {}", stats.handled, stats.failed);

    Ok(if stats.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn print_balance(app: &Backoffice, customer_id: &str) -> BackofficeResult<()> {
    let balances = app.db.balances();
    let total = balances.balance(customer_id).await?;
    let entries = balances.entries(customer_id).await?;

    println!("customer {customer_id}: {total}");
    for entry in entries {
        println!(
            "  {}  {:>10}  {}  {}:{}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.amount.to_string(),
            entry.reason,
            entry.source_type,
            entry.source_id
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("backoffice")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_settle_with_config() {
        let (path, command) = parse_args(&args(&["--config", "bo.toml", "settle", "ret-1", "ret-2"]))
            .unwrap()
            .unwrap();
        assert_eq!(path, Some(PathBuf::from("bo.toml")));
        assert!(matches!(command, Command::Settle(ids) if ids == ["ret-1", "ret-2"]));
    }

    #[test]
    fn test_parse_balance() {
        let (path, command) = parse_args(&args(&["balance", "42"])).unwrap().unwrap();
        assert!(path.is_none());
        assert!(matches!(command, Command::Balance(id) if id == "42"));
    }

    #[test]
    fn test_parse_errors_and_help() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["settle"])).is_err());
        assert!(parse_args(&args(&["refund", "x"])).is_err());
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["settle", "--help"])).unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        let err = parse_args(&args(&["settle", "ret-1", "  "])).unwrap_err();
        assert!(err.contains("sale_return_id"));

        let long = "x".repeat(65);
        let err = parse_args(&args(&["balance", &long])).unwrap_err();
        assert!(err.contains("customer_id"));
    }
}
