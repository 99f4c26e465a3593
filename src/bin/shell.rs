//! OrionDB Shell
//!
//! Line-oriented REPL over one database file.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use oriondb::{Config, FlushStrategy, Statement, Table};
use tracing_subscriber::{fmt, EnvFilter};

/// OrionDB Shell
#[derive(Parser, Debug)]
#[command(name = "oriondb-shell")]
#[command(about = "Single-table B-tree storage engine shell")]
#[command(version)]
struct Args {
    /// Database file (created on first use)
    file: PathBuf,

    /// Flush pages after every insert instead of only after structural changes
    #[arg(long)]
    flush_every_insert: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,oriondb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("OrionDB Shell v{}", oriondb::VERSION);
    tracing::info!("Database file: {}", args.file.display());

    let strategy = if args.flush_every_insert {
        FlushStrategy::EveryInsert
    } else {
        FlushStrategy::StructuralOnly
    };
    let config = Config::builder()
        .path(&args.file)
        .flush_strategy(strategy)
        .build();

    let mut table = match Table::open(config) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("db > ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        // Meta-commands
        if let Some(meta) = input.strip_prefix('.') {
            match meta {
                "exit" => break,
                "help" => print_help(),
                _ => println!("Unrecognized command: .{}", meta),
            }
            continue;
        }

        // Statements: parse, then hand to the engine. Errors are printed and
        // the loop continues; nothing here is fatal.
        match Statement::parse(input) {
            Ok(Statement::Insert(row)) => match table.insert(&row) {
                Ok(()) => println!("Executed."),
                Err(e) => println!("Error: {}", e),
            },
            Ok(Statement::Select) => match table.scan() {
                Ok(scan) => {
                    let mut failed = false;
                    for row in scan {
                        match row {
                            Ok(row) => println!("{}", row),
                            Err(e) => {
                                println!("Error: {}", e);
                                failed = true;
                                break;
                            }
                        }
                    }
                    if !failed {
                        println!("Executed.");
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            Err(e) => println!("Error: {}", e),
        }
    }

    if let Err(e) = table.close() {
        tracing::error!("Failed to close database: {}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!(".exit                            close the database and leave");
    println!(".help                            show this message");
    println!("insert <id> <username> <email>   insert one row");
    println!("select                           print every row in key order");
}
