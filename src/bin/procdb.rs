//! procdb interactive driver
//!
//! Loads a data file, then reads commands from stdin until `exit` or EOF.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use procdb::config::WalSyncStrategy;
use procdb::{Config, Engine, Record};
use tracing_subscriber::{fmt, EnvFilter};

/// procdb
#[derive(Parser, Debug)]
#[command(name = "procdb")]
#[command(about = "Fixed-capacity process record store")]
#[command(version)]
struct Args {
    /// Data file (the WAL lives next to it as <db>.wal)
    #[arg(short, long, default_value = "process.db")]
    db: PathBuf,

    /// Number of record slots
    #[arg(short, long, default_value = "1000")]
    capacity: usize,

    /// WAL sync strategy: "every-write" or "every-n:<count>"
    #[arg(short, long, default_value = "every-write", value_parser = parse_sync_strategy)]
    sync: WalSyncStrategy,

    /// Disable the write-ahead log
    #[arg(long)]
    no_wal: bool,
}

fn parse_sync_strategy(s: &str) -> Result<WalSyncStrategy, String> {
    match s {
        "every-write" => Ok(WalSyncStrategy::EveryWrite),
        _ => s
            .strip_prefix("every-n:")
            .and_then(|n| n.parse().ok())
            .map(|count| WalSyncStrategy::EveryNEntries { count })
            .ok_or_else(|| format!("invalid sync strategy: {}", s)),
    }
}

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Add { name: String },
    Delete { name: String },
    Find { name: String },
    Update { name: String, cpu: u32, ram: u32 },
    List,
    Flush,
    Exit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let name = || {
            if rest.is_empty() {
                Err(format!("usage: {} <name>", verb))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb {
            "add" => Ok(Command::Add { name: name()? }),
            "delete" => Ok(Command::Delete { name: name()? }),
            "find" => Ok(Command::Find { name: name()? }),
            "update" => {
                let mut parts = rest.rsplitn(3, char::is_whitespace);
                let ram = parts.next().and_then(|v| v.parse().ok());
                let cpu = parts.next().and_then(|v| v.parse().ok());
                let name = parts.next().map(str::trim).filter(|n| !n.is_empty());
                match (name, cpu, ram) {
                    (Some(name), Some(cpu), Some(ram)) => Ok(Command::Update {
                        name: name.to_string(),
                        cpu,
                        ram,
                    }),
                    _ => Err("usage: update <name> <cpu> <ram>".to_string()),
                }
            }
            "list" | "view" => Ok(Command::List),
            "flush" => Ok(Command::Flush),
            "exit" | "quit" => Ok(Command::Exit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

fn print_record(record: &Record) {
    println!(
        "Name: {}\tPID: {}\tCPU: {}\tRAM: {}",
        record.name, record.id, record.cpu, record.ram
    );
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,procdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("procdb v{}", procdb::VERSION);
    tracing::info!("Data file: {}", args.db.display());

    let config = Config::builder()
        .capacity(args.capacity)
        .default_path(&args.db)
        .wal_enabled(!args.no_wal)
        .wal_sync_strategy(args.sync)
        .build();

    let mut engine = match Engine::with_config(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to start engine: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = engine.load_default() {
        tracing::error!("Failed to load database: {}", e);
        std::process::exit(1);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(cmd) => cmd,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };

        match command {
            Command::Add { name } => match engine.add(&name) {
                Ok(_) => println!("Added process {}", name),
                Err(e) => println!("Failed to add process {}: {}", name, e),
            },
            Command::Delete { name } => match engine.delete(&name) {
                Ok(()) => println!("Deleted process {}", name),
                Err(e) => println!("Failed to delete process {}: {}", name, e),
            },
            Command::Find { name } => match engine.find(&name) {
                Ok(record) => print_record(record),
                Err(_) => println!("Process {} not found", name),
            },
            Command::Update { name, cpu, ram } => match engine.update(&name, cpu, ram) {
                Ok(record) => print_record(record),
                Err(e) => println!("Failed to update process {}: {}", name, e),
            },
            Command::List => match engine.list() {
                Ok(records) => {
                    let mut any = false;
                    for record in records {
                        print_record(record);
                        any = true;
                    }
                    if !any {
                        println!("No process");
                    }
                }
                Err(e) => println!("Failed to list processes: {}", e),
            },
            Command::Flush => match engine.flush() {
                Ok(()) => println!("Flushed"),
                Err(e) => println!("Flush failed: {}", e),
            },
            Command::Exit => break,
        }
    }

    if let Err(e) = engine.flush() {
        tracing::error!("Failed to flush on exit: {}", e);
    }
    if let Err(e) = engine.destroy() {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }
}
