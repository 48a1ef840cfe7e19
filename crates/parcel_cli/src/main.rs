//! Command-line entry point for the parcel tracker.
//!
//! # Responsibility
//! - Resolve database and logging configuration from flags/environment.
//! - Map subcommands onto `ParcelService` use-cases.
//! - Print one line per parcel; report failures on stderr with exit code 1.

use clap::{Parser, Subcommand, ValueEnum};
use parcel_core::db::open_db;
use parcel_core::{
    core_version, default_log_level, init_logging, ClientId, Parcel, ParcelNumber, ParcelService,
    ParcelStatus, SqliteParcelRepository,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "parcel", version = core_version(), about = "Track parcels through their lifecycle")]
struct Cli {
    /// SQLite database file; created with the parcel table when missing.
    #[arg(long, env = "PARCEL_DB", default_value = "tracker.db")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "PARCEL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotated log files. Logging is off when unset.
    #[arg(long, env = "PARCEL_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new parcel in `registered` status.
    Register {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
    },
    /// Show one parcel.
    Get { number: ParcelNumber },
    /// List all parcels of a client.
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Advance a parcel to its next status.
    NextStatus { number: ParcelNumber },
    /// Overwrite a parcel's status.
    SetStatus {
        number: ParcelNumber,
        status: StatusArg,
    },
    /// Change the address of a registered parcel.
    SetAddress {
        number: ParcelNumber,
        address: String,
    },
    /// Delete a registered parcel.
    Delete { number: ParcelNumber },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Registered,
    Sent,
    Delivered,
}

impl From<StatusArg> for ParcelStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Registered => ParcelStatus::Registered,
            StatusArg::Sent => ParcelStatus::Sent,
            StatusArg::Delivered => ParcelStatus::Delivered,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let conn = open_db(&cli.db)?;
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn)?);

    match cli.command {
        Command::Register { client, address } => {
            let parcel = service.register(client, address)?;
            println!("registered {}", describe(&parcel));
        }
        Command::Get { number } => println!("{}", describe(&service.get(number)?)),
        Command::List { client } => {
            let parcels = service.client_parcels(client)?;
            if parcels.is_empty() {
                println!("client {client} has no parcels");
            }
            for parcel in &parcels {
                println!("{}", describe(parcel));
            }
        }
        Command::NextStatus { number } => match service.next_status(number)? {
            Some(status) => println!("parcel {number} is now {status}"),
            None => println!("parcel {number} is already delivered"),
        },
        Command::SetStatus { number, status } => {
            service.set_status(number, status.into())?;
            println!("parcel {number} status set");
        }
        Command::SetAddress { number, address } => {
            service.change_address(number, &address)?;
            println!("parcel {number} address changed");
        }
        Command::Delete { number } => {
            service.delete(number)?;
            println!("parcel {number} deleted if it was registered");
        }
    }

    Ok(())
}

fn describe(parcel: &Parcel) -> String {
    format!(
        "parcel {} client={} status={} address={:?} created_at={}",
        parcel.number, parcel.client, parcel.status, parcel.address, parcel.created_at
    )
}
