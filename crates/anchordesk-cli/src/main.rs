//! Anchordesk CLI - closure digests and audit trail operations.

use clap::{Parser, Subcommand};

mod commands;
mod output;
mod path;

use commands::{canonicalize, digest, list, verify};

#[derive(Parser)]
#[command(name = "anchordesk")]
#[command(about = "Anchordesk closure digest and audit trail CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show canonical bytes for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Compute the ledger digest for a ticket resolution
    Digest {
        /// Ticket identifier
        #[arg(long)]
        ticket: String,
        /// Resolution text
        #[arg(long)]
        resolution: String,
        /// Closure timestamp (RFC3339 with Z suffix)
        #[arg(long)]
        closed_at: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Audit trail operations
    #[command(subcommand)]
    Audit(AuditCommands),
}

#[derive(Subcommand)]
enum AuditCommands {
    /// List events in an audit trail
    List {
        /// Path to trail file
        trail: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Stop after reading N events (default: unlimited)
        #[arg(long)]
        max_events: Option<u64>,
    },
    /// Verify all event ids in an audit trail
    Verify {
        /// Path to trail file
        trail: String,
        /// Exit with error code if any verification fails
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Stop after reading N events (default: unlimited)
        #[arg(long)]
        max_events: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::Digest {
            ticket,
            resolution,
            closed_at,
            json,
        } => digest::run(ticket, resolution, closed_at, json),
        Commands::Audit(AuditCommands::List {
            trail,
            json,
            max_events,
        }) => list::run(trail, json, max_events),
        Commands::Audit(AuditCommands::Verify {
            trail,
            strict,
            json,
            max_events,
        }) => verify::run(trail, strict, json, max_events),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
